//! Safe RAII wrapper around `llama_model` and its vocabulary.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{BridgeError, Result};
use crate::llama::token;
use crate::provider::{Token, Vocabulary, path_cstring};

/// Owns a `llama_model` pointer and frees it on drop.
pub struct LlamaModel {
    ptr: *mut llama_sys::llama_model,
    vocab: LlamaVocab,
}

// Safety: llama_model is internally read-only after creation.
unsafe impl Send for LlamaModel {}
unsafe impl Sync for LlamaModel {}

impl LlamaModel {
    /// Load a GGUF model from `path`, CPU only.
    pub fn load_from_file(path: &Path, params: &ModelParams) -> Result<Self> {
        let c_path = path_cstring(path)?;

        let mut raw = unsafe { llama_sys::llama_model_default_params() };
        raw.n_gpu_layers = 0;
        raw.use_mmap = params.use_mmap;
        raw.use_mlock = params.use_mlock;

        info!(path = %path.display(), "Loading model…");
        let model = unsafe { llama_sys::llama_model_load_from_file(c_path.as_ptr(), raw) };

        if model.is_null() {
            return Err(BridgeError::ModelLoadFailed {
                path: path.display().to_string(),
                reason: "llama_model_load_from_file returned null".into(),
            });
        }

        let vocab_ptr = unsafe { llama_sys::llama_model_get_vocab(model) };
        let vocab = LlamaVocab {
            ptr: vocab_ptr,
            n_vocab: unsafe { llama_sys::llama_vocab_n_tokens(vocab_ptr) }.max(0) as usize,
            eos: unsafe { llama_sys::llama_vocab_eos(vocab_ptr) },
        };

        info!(path = %path.display(), n_vocab = vocab.n_vocab, "Model loaded");
        Ok(Self { ptr: model, vocab })
    }

    pub(crate) fn as_ptr(&self) -> *mut llama_sys::llama_model {
        self.ptr
    }

    pub fn vocab(&self) -> &LlamaVocab {
        &self.vocab
    }
}

impl Drop for LlamaModel {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            debug!("Freeing llama model");
            unsafe { llama_sys::llama_model_free(self.ptr) }
        }
    }
}

/// Parameters for [`LlamaModel::load_from_file`].
#[derive(Debug, Clone)]
pub struct ModelParams {
    /// Use memory-mapped I/O.
    pub use_mmap: bool,
    /// Lock model memory (prevent swapping).
    pub use_mlock: bool,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            use_mmap: true,
            use_mlock: false,
        }
    }
}

/// Vocabulary handle, valid for the lifetime of its [`LlamaModel`].
pub struct LlamaVocab {
    ptr: *const llama_sys::llama_vocab,
    n_vocab: usize,
    eos: Token,
}

// Safety: the vocabulary is immutable once the model is loaded.
unsafe impl Send for LlamaVocab {}
unsafe impl Sync for LlamaVocab {}

impl Vocabulary for LlamaVocab {
    fn tokenize(&self, text: &str, add_special: bool) -> Result<Vec<Token>> {
        token::tokenize(self.ptr, text, add_special, true)
    }

    fn token_piece(&self, token: Token) -> Option<String> {
        if token < 0 || token as usize >= self.n_vocab {
            return None;
        }
        token::token_to_piece(self.ptr, token)
    }

    fn eos(&self) -> Token {
        self.eos
    }

    fn n_vocab(&self) -> usize {
        self.n_vocab
    }
}
