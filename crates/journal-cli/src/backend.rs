//! Native backend selection.
//!
//! With the `llama` / `whisper` features the commands run on llama.cpp and
//! whisper.cpp. Without them every load fails with
//! [`BridgeError::BackendUnavailable`], so the CLI still builds and its
//! config commands still work on machines without the native libraries.

#[cfg(not(all(feature = "llama", feature = "whisper")))]
use std::path::Path;

#[cfg(not(all(feature = "llama", feature = "whisper")))]
use journal_core::BridgeError;

#[cfg(feature = "llama")]
pub type Text = journal_core::llama::LlamaBackend;
#[cfg(not(feature = "llama"))]
pub type Text = Disabled;

#[cfg(feature = "whisper")]
pub type Speech = journal_core::whisper::WhisperBackend;
#[cfg(not(feature = "whisper"))]
pub type Speech = Disabled;

/// Stand-in backend for a build without native inference.
#[cfg(not(all(feature = "llama", feature = "whisper")))]
#[derive(Debug, Clone, Copy, Default)]
pub struct Disabled;

/// A model that can never be constructed.
#[cfg(not(all(feature = "llama", feature = "whisper")))]
pub enum Never {}

#[cfg(not(feature = "llama"))]
mod text {
    use super::*;
    use journal_core::{Batch, ContextParams, Decoder, TextBackend, Token, Vocabulary};

    impl Vocabulary for Never {
        fn tokenize(&self, _text: &str, _add_special: bool) -> journal_core::Result<Vec<Token>> {
            match *self {}
        }
        fn token_piece(&self, _token: Token) -> Option<String> {
            match *self {}
        }
        fn eos(&self) -> Token {
            match *self {}
        }
        fn n_vocab(&self) -> usize {
            match *self {}
        }
    }

    impl Decoder for Never {
        type Vocab = Never;

        fn vocab(&self) -> &Never {
            self
        }
        fn reset(&mut self) {
            match *self {}
        }
        fn decode(&mut self, _batch: &Batch) -> journal_core::Result<()> {
            match *self {}
        }
        fn logits(&self) -> Option<&[f32]> {
            match *self {}
        }
    }

    impl TextBackend for Disabled {
        type Model = Never;

        fn load(&self, _path: &Path, _params: &ContextParams) -> journal_core::Result<Never> {
            Err(BridgeError::BackendUnavailable(
                "built without the `llama` feature".into(),
            ))
        }
    }
}

#[cfg(not(feature = "whisper"))]
mod speech {
    use super::*;
    use journal_core::{FullParams, SpeechBackend, SpeechModel, SpeechParams};

    impl SpeechModel for Never {
        fn full(&mut self, _samples: &[f32], _params: &FullParams) -> journal_core::Result<()> {
            match *self {}
        }
        fn segments(&self) -> Vec<String> {
            match *self {}
        }
    }

    impl SpeechBackend for Disabled {
        type Model = Never;

        fn load(&self, _path: &Path, _params: &SpeechParams) -> journal_core::Result<Never> {
            Err(BridgeError::BackendUnavailable(
                "built without the `whisper` feature".into(),
            ))
        }
    }
}
