//! llama.cpp-backed [`TextBackend`].

mod backend;
mod batch;
mod context;
mod model;
mod token;

use std::path::Path;

use crate::batch::Batch;
use crate::context::ContextParams;
use crate::error::Result;
use crate::provider::{Decoder, TextBackend};

pub use backend::BackendRef;
pub use context::LlamaContext;
pub use model::{LlamaModel, LlamaVocab, ModelParams};

/// Loads GGUF models through llama.cpp.
#[derive(Debug, Clone, Default)]
pub struct LlamaBackend {
    pub model_params: ModelParams,
}

impl TextBackend for LlamaBackend {
    type Model = LlamaTextModel;

    fn load(&self, path: &Path, params: &ContextParams) -> Result<LlamaTextModel> {
        let backend = BackendRef::acquire();
        let model = LlamaModel::load_from_file(path, &self.model_params)?;
        let ctx = LlamaContext::new(model, params)?;
        Ok(LlamaTextModel {
            ctx,
            _backend: backend,
        })
    }
}

/// A loaded model with its evaluation context.
///
/// Field order is drop order: context, then model, then the backend
/// reference.
pub struct LlamaTextModel {
    ctx: LlamaContext,
    _backend: BackendRef,
}

impl Decoder for LlamaTextModel {
    type Vocab = LlamaVocab;

    fn vocab(&self) -> &LlamaVocab {
        self.ctx.model().vocab()
    }

    fn reset(&mut self) {
        self.ctx.kv_cache_clear();
    }

    fn decode(&mut self, batch: &Batch) -> Result<()> {
        self.ctx.decode(batch)
    }

    fn logits(&self) -> Option<&[f32]> {
        self.ctx.last_logits()
    }
}
