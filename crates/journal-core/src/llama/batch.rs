//! RAII `llama_batch` filled from a [`Batch`](crate::batch::Batch).

use crate::batch::Batch;

pub struct RawBatch {
    inner: llama_sys::llama_batch,
}

impl RawBatch {
    /// Allocate a native batch and copy every entry of `batch` into it.
    pub fn from_batch(batch: &Batch) -> Self {
        let n = batch.n_tokens().max(1) as i32;
        let mut inner = unsafe { llama_sys::llama_batch_init(n, 0, 1) };

        for (i, entry) in batch.entries().iter().enumerate() {
            unsafe {
                *inner.token.add(i) = entry.token;
                *inner.pos.add(i) = entry.pos;
                *inner.n_seq_id.add(i) = 1;
                *(*inner.seq_id.add(i)) = entry.seq_id;
                *inner.logits.add(i) = i8::from(entry.logits);
            }
        }
        inner.n_tokens = batch.n_tokens() as i32;
        Self { inner }
    }

    /// The raw batch struct (passed by value, `Copy` in C).
    pub fn raw(&self) -> llama_sys::llama_batch {
        self.inner
    }
}

impl Drop for RawBatch {
    fn drop(&mut self) {
        unsafe { llama_sys::llama_batch_free(self.inner) }
    }
}
