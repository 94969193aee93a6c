//! Deterministic toy backends for engine tests.
//!
//! Text model: vocabulary is BOS (0), EOS (1), printable ASCII 32..=126
//! (2..=96) and one token without text (97). After a lowercase letter the
//! model always predicts the next letter; after `z`, or anything that is
//! not a lowercase letter or `!`, it predicts EOS; after `!` it predicts
//! the textless token. Positions past the context window fail to decode,
//! like a full KV cache.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use journal_core::{
    Batch, BridgeError, ContextParams, Decoder, FullParams, Result, SpeechBackend, SpeechModel,
    SpeechParams, TextBackend, Token, Vocabulary,
};

pub const BOS: Token = 0;
pub const EOS: Token = 1;
pub const TEXTLESS: Token = 97;
pub const N_VOCAB: usize = 98;
pub const DEFAULT_N_CTX: u32 = 64;

const MAGIC: &str = "TOYM";

pub fn write_model(dir: &Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, MAGIC).unwrap();
    path
}

pub struct ToyVocab;

impl Vocabulary for ToyVocab {
    fn tokenize(&self, text: &str, add_special: bool) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        if add_special && !text.is_empty() {
            tokens.push(BOS);
        }
        for b in text.bytes() {
            if !(32..=126).contains(&b) {
                return Err(BridgeError::TokenizationFailed(format!("byte {b}")));
            }
            tokens.push(Token::from(b) - 30);
        }
        Ok(tokens)
    }

    fn token_piece(&self, token: Token) -> Option<String> {
        (2..=96)
            .contains(&token)
            .then(|| char::from((token + 30) as u8).to_string())
    }

    fn eos(&self) -> Token {
        EOS
    }

    fn n_vocab(&self) -> usize {
        N_VOCAB
    }
}

fn successor(token: Token) -> Token {
    match (token + 30) as u8 {
        b'a'..=b'y' => token + 1,
        b'!' => TEXTLESS,
        _ => EOS,
    }
}

/// Counters shared by every model of one [`ToyBackend`].
#[derive(Default)]
pub struct Probe {
    /// Models currently alive (incremented on load, decremented on drop).
    pub live: AtomicUsize,
    /// Decode calls currently executing.
    pub in_flight: AtomicUsize,
    /// Highest `in_flight` ever observed.
    pub peak: AtomicUsize,
    /// Model id of every decode call, in order.
    pub decode_log: Mutex<Vec<usize>>,
}

pub struct ToyModel {
    id: usize,
    vocab: ToyVocab,
    n_ctx: u32,
    n_past: i32,
    logits: Vec<f32>,
    delay: Duration,
    probe: Arc<Probe>,
}

impl Decoder for ToyModel {
    type Vocab = ToyVocab;

    fn vocab(&self) -> &ToyVocab {
        &self.vocab
    }

    fn reset(&mut self) {
        self.n_past = 0;
        self.logits.clear();
    }

    fn decode(&mut self, batch: &Batch) -> Result<()> {
        let now = self.probe.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.probe.peak.fetch_max(now, Ordering::SeqCst);
        self.probe.decode_log.lock().unwrap().push(self.id);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        let result = self.eval(batch);
        self.probe.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn logits(&self) -> Option<&[f32]> {
        (!self.logits.is_empty()).then_some(self.logits.as_slice())
    }
}

impl ToyModel {
    fn eval(&mut self, batch: &Batch) -> Result<()> {
        let mut last = None;
        for entry in batch.entries() {
            if entry.pos != self.n_past {
                return Err(BridgeError::DecodeFailed(-1));
            }
            if entry.pos as u32 >= self.n_ctx {
                return Err(BridgeError::DecodeFailed(1));
            }
            self.n_past += 1;
            if entry.logits {
                last = Some(entry.token);
            }
        }
        self.logits = vec![0.0; N_VOCAB];
        if let Some(token) = last {
            self.logits[successor(token) as usize] = 1.0;
        } else {
            self.logits.clear();
        }
        Ok(())
    }
}

impl Drop for ToyModel {
    fn drop(&mut self) {
        self.probe.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct ToyBackend {
    pub delay: Duration,
    pub probe: Arc<Probe>,
    next_id: AtomicUsize,
}

impl ToyBackend {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }
}

impl TextBackend for ToyBackend {
    type Model = ToyModel;

    fn load(&self, path: &Path, params: &ContextParams) -> Result<ToyModel> {
        let contents = std::fs::read_to_string(path).map_err(|e| BridgeError::ModelLoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        if contents != MAGIC {
            return Err(BridgeError::ModelLoadFailed {
                path: path.display().to_string(),
                reason: "not a toy model".into(),
            });
        }
        self.probe.live.fetch_add(1, Ordering::SeqCst);
        Ok(ToyModel {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            vocab: ToyVocab,
            n_ctx: if params.n_ctx == 0 { DEFAULT_N_CTX } else { params.n_ctx },
            n_past: 0,
            logits: Vec::new(),
            delay: self.delay,
            probe: self.probe.clone(),
        })
    }
}

/// Speech model that reports how many samples it heard. A NaN sample
/// makes inference fail.
pub struct ToySpeech {
    segments: Vec<String>,
    pub calls: Arc<AtomicUsize>,
}

impl SpeechModel for ToySpeech {
    fn full(&mut self, samples: &[f32], _params: &FullParams) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if samples.iter().any(|s| s.is_nan()) {
            return Err(BridgeError::TranscriptionFailed(-2));
        }
        self.segments = vec![" heard".into(), format!(" {} samples", samples.len())];
        Ok(())
    }

    fn segments(&self) -> Vec<String> {
        self.segments.clone()
    }
}

#[derive(Default)]
pub struct ToySpeechBackend {
    pub calls: Arc<AtomicUsize>,
}

impl SpeechBackend for ToySpeechBackend {
    type Model = ToySpeech;

    fn load(&self, path: &Path, _params: &SpeechParams) -> Result<ToySpeech> {
        if !path.exists() {
            return Err(BridgeError::ModelLoadFailed {
                path: path.display().to_string(),
                reason: "missing".into(),
            });
        }
        Ok(ToySpeech {
            segments: Vec::new(),
            calls: self.calls.clone(),
        })
    }
}
