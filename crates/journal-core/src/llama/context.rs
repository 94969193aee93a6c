//! Safe RAII wrapper around `llama_context`.

use tracing::debug;

use crate::batch::Batch;
use crate::context::ContextParams;
use crate::error::{BridgeError, Result};
use crate::llama::batch::RawBatch;
use crate::llama::model::LlamaModel;
use crate::provider::Vocabulary;

/// Owns a `llama_context` pointer and the model it was created from.
///
/// The context is freed in `drop`, before the `model` field is dropped.
pub struct LlamaContext {
    ptr: *mut llama_sys::llama_context,
    model: LlamaModel,
    /// Batch index whose logits the last decode produced.
    logits_idx: i32,
}

// Safety: all use of the context is &mut self (single-threaded access
// enforced by the engine's per-model Mutex).
unsafe impl Send for LlamaContext {}

impl LlamaContext {
    pub fn new(model: LlamaModel, params: &ContextParams) -> Result<Self> {
        let mut raw = unsafe { llama_sys::llama_context_default_params() };
        raw.n_ctx = params.n_ctx;
        raw.n_threads = params.n_threads;
        raw.n_threads_batch = params.n_threads;
        // The priming pass submits the whole prompt as one batch.
        if params.n_ctx > 0 {
            raw.n_batch = params.n_ctx;
        }

        let ctx = unsafe { llama_sys::llama_init_from_model(model.as_ptr(), raw) };
        if ctx.is_null() {
            return Err(BridgeError::ContextCreationFailed(
                "llama_init_from_model returned null".into(),
            ));
        }

        debug!(n_ctx = params.n_ctx, n_threads = params.n_threads, "Context created");
        Ok(Self {
            ptr: ctx,
            model,
            logits_idx: -1,
        })
    }

    pub fn model(&self) -> &LlamaModel {
        &self.model
    }

    pub fn decode(&mut self, batch: &Batch) -> Result<()> {
        let raw = RawBatch::from_batch(batch);
        let rc = unsafe { llama_sys::llama_decode(self.ptr, raw.raw()) };
        if rc != 0 {
            self.logits_idx = -1;
            return Err(BridgeError::DecodeFailed(rc));
        }
        self.logits_idx = batch
            .entries()
            .iter()
            .rposition(|e| e.logits)
            .map_or(-1, |i| i as i32);
        Ok(())
    }

    /// Logits for the output position of the last decode.
    pub fn last_logits(&self) -> Option<&[f32]> {
        if self.logits_idx < 0 {
            return None;
        }
        unsafe {
            let p = llama_sys::llama_get_logits_ith(self.ptr, self.logits_idx);
            if p.is_null() {
                None
            } else {
                Some(std::slice::from_raw_parts(p, self.model.vocab().n_vocab()))
            }
        }
    }

    pub fn kv_cache_clear(&mut self) {
        unsafe {
            let mem = llama_sys::llama_get_memory(self.ptr);
            if !mem.is_null() {
                llama_sys::llama_memory_clear(mem, false);
            }
        }
        self.logits_idx = -1;
    }
}

impl Drop for LlamaContext {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            debug!("Freeing llama context");
            unsafe { llama_sys::llama_free(self.ptr) }
        }
    }
}
