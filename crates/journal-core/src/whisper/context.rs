//! Safe RAII wrapper around `whisper_context`.

use std::ffi::CStr;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{BridgeError, Result};
use crate::provider::{SpeechModel, path_cstring};
use crate::transcribe::{FullParams, SpeechParams};

/// Owns a `whisper_context` pointer and frees it on drop.
pub struct WhisperContext {
    ptr: *mut whisper_sys::whisper_context,
}

// Safety: every call goes through &mut self behind the engine's Mutex.
unsafe impl Send for WhisperContext {}

impl WhisperContext {
    pub fn load(path: &Path, params: &SpeechParams) -> Result<Self> {
        let c_path = path_cstring(path)?;

        let mut raw = unsafe { whisper_sys::whisper_context_default_params() };
        raw.use_gpu = params.use_gpu;

        info!(path = %path.display(), "Loading speech model…");
        let ctx = unsafe { whisper_sys::whisper_init_from_file_with_params(c_path.as_ptr(), raw) };
        if ctx.is_null() {
            return Err(BridgeError::ModelLoadFailed {
                path: path.display().to_string(),
                reason: "whisper_init_from_file_with_params returned null".into(),
            });
        }

        info!(path = %path.display(), n_threads = params.n_threads, "Speech model loaded");
        Ok(Self { ptr: ctx })
    }
}

impl SpeechModel for WhisperContext {
    fn full(&mut self, samples: &[f32], params: &FullParams) -> Result<()> {
        let mut raw = unsafe {
            whisper_sys::whisper_full_default_params(
                whisper_sys::whisper_sampling_strategy_WHISPER_SAMPLING_GREEDY,
            )
        };
        raw.n_threads = params.n_threads;
        raw.print_progress = params.print_progress;
        raw.print_realtime = params.print_realtime;
        raw.print_timestamps = params.print_timestamps;
        raw.no_context = params.no_context;
        raw.single_segment = params.single_segment;

        let rc = unsafe {
            whisper_sys::whisper_full(self.ptr, raw, samples.as_ptr(), samples.len() as i32)
        };
        if rc != 0 {
            return Err(BridgeError::TranscriptionFailed(rc));
        }
        Ok(())
    }

    fn segments(&self) -> Vec<String> {
        let n = unsafe { whisper_sys::whisper_full_n_segments(self.ptr) };
        (0..n)
            .filter_map(|i| unsafe {
                let p = whisper_sys::whisper_full_get_segment_text(self.ptr, i);
                (!p.is_null()).then(|| CStr::from_ptr(p).to_string_lossy().into_owned())
            })
            .collect()
    }
}

impl Drop for WhisperContext {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            debug!("Freeing whisper context");
            unsafe { whisper_sys::whisper_free(self.ptr) }
        }
    }
}
