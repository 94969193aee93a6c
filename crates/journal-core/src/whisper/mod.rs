//! whisper.cpp-backed [`SpeechBackend`].

mod context;

use std::path::Path;
use std::sync::Once;

use crate::error::Result;
use crate::provider::SpeechBackend;
use crate::transcribe::SpeechParams;

pub use context::WhisperContext;

static LOG_CALLBACK: Once = Once::new();

/// Loads ggml acoustic models through whisper.cpp, CPU only.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhisperBackend;

impl SpeechBackend for WhisperBackend {
    type Model = WhisperContext;

    fn load(&self, path: &Path, params: &SpeechParams) -> Result<WhisperContext> {
        LOG_CALLBACK.call_once(install_log_callback);
        WhisperContext::load(path, params)
    }
}

/// Bridge whisper.cpp logs into `tracing`.
fn install_log_callback() {
    unsafe extern "C" fn cb(
        level: whisper_sys::ggml_log_level,
        text: *const std::ffi::c_char,
        _user_data: *mut std::ffi::c_void,
    ) {
        if text.is_null() {
            return;
        }
        let msg = unsafe { std::ffi::CStr::from_ptr(text) }.to_string_lossy();
        let msg = msg.trim();
        if msg.is_empty() {
            return;
        }
        match level {
            4 => tracing::error!(target: "whisper.cpp", "{msg}"),
            3 => tracing::warn!(target: "whisper.cpp", "{msg}"),
            2 => tracing::debug!(target: "whisper.cpp", "{msg}"),
            _ => tracing::trace!(target: "whisper.cpp", "{msg}"),
        }
    }

    unsafe {
        whisper_sys::whisper_log_set(Some(cb), std::ptr::null_mut());
    }
}
