//! Capability traits for the native collaborators.
//!
//! The engines only ever talk to these traits. The llama.cpp and
//! whisper.cpp wrappers implement them behind the `llama` / `whisper`
//! features; tests implement them with small deterministic models.

use std::path::Path;

use crate::batch::Batch;
use crate::context::ContextParams;
use crate::error::Result;
use crate::transcribe::{FullParams, SpeechParams};

/// NUL-terminated copy of a model path for the native loaders.
#[cfg(any(feature = "llama", feature = "whisper"))]
pub(crate) fn path_cstring(path: &Path) -> Result<std::ffi::CString> {
    let load_failed = |reason: &str| crate::error::BridgeError::ModelLoadFailed {
        path: path.display().to_string(),
        reason: reason.into(),
    };
    let text = path.to_str().ok_or_else(|| load_failed("Invalid UTF-8 in path"))?;
    std::ffi::CString::new(text).map_err(|_| load_failed("Path contains null byte"))
}

/// Vocabulary token id.
pub type Token = i32;

/// Text ⇄ token conversion owned by a loaded model.
pub trait Vocabulary {
    /// Tokenize `text`, adding BOS/EOS markers when `add_special` is set
    /// and the vocabulary asks for them.
    fn tokenize(&self, text: &str, add_special: bool) -> Result<Vec<Token>>;

    /// Text fragment for a single token, `None` when it cannot be resolved.
    fn token_piece(&self, token: Token) -> Option<String>;

    fn eos(&self) -> Token;

    fn n_vocab(&self) -> usize;
}

/// A loaded model plus its position-indexed evaluation context.
pub trait Decoder: Send {
    type Vocab: Vocabulary;

    fn vocab(&self) -> &Self::Vocab;

    /// Drop every cached position so the next batch may start at 0.
    fn reset(&mut self);

    /// Evaluate `batch`. The error carries the native status code.
    fn decode(&mut self, batch: &Batch) -> Result<()>;

    /// Output distribution of the last position that requested one.
    fn logits(&self) -> Option<&[f32]>;
}

/// Loads text models.
pub trait TextBackend: Send + Sync {
    type Model: Decoder + 'static;

    fn load(&self, path: &Path, params: &ContextParams) -> Result<Self::Model>;
}

/// A loaded acoustic model.
pub trait SpeechModel: Send {
    /// One full-buffer inference pass.
    fn full(&mut self, samples: &[f32], params: &FullParams) -> Result<()>;

    /// Segment texts produced by the last successful [`full`](Self::full).
    fn segments(&self) -> Vec<String>;
}

/// Loads acoustic models.
pub trait SpeechBackend: Send + Sync {
    type Model: SpeechModel + 'static;

    fn load(&self, path: &Path, params: &SpeechParams) -> Result<Self::Model>;
}
