//! Process-wide llama.cpp backend, reference counted by loaded models.

use std::ffi::CStr;
use std::sync::{Mutex, Once, PoisonError};

use tracing::{debug, info};

static LIVE_MODELS: Mutex<usize> = Mutex::new(0);
static LOG_CALLBACK: Once = Once::new();

/// Keeps the llama.cpp backend initialized while held.
///
/// The first reference initializes the backend; dropping the last one
/// frees it again, so a backend never outlives the models using it.
pub struct BackendRef {
    _private: (),
}

impl BackendRef {
    pub fn acquire() -> Self {
        let mut live = LIVE_MODELS.lock().unwrap_or_else(PoisonError::into_inner);
        if *live == 0 {
            LOG_CALLBACK.call_once(install_log_callback);
            unsafe {
                llama_sys::llama_backend_init();
            }
            info!("llama.cpp backend initialized");
        }
        *live += 1;
        Self { _private: () }
    }
}

impl Drop for BackendRef {
    fn drop(&mut self) {
        let mut live = LIVE_MODELS.lock().unwrap_or_else(PoisonError::into_inner);
        *live -= 1;
        if *live == 0 {
            unsafe {
                llama_sys::llama_backend_free();
            }
            debug!("llama.cpp backend freed");
        }
    }
}

/// Bridge llama.cpp logs into `tracing`.
fn install_log_callback() {
    unsafe extern "C" fn cb(
        level: llama_sys::ggml_log_level,
        text: *const std::ffi::c_char,
        _user_data: *mut std::ffi::c_void,
    ) {
        if text.is_null() {
            return;
        }
        let msg = unsafe { CStr::from_ptr(text) }.to_string_lossy();
        let msg = msg.trim();
        if msg.is_empty() {
            return;
        }
        // ggml_log_level: DEBUG=1, INFO=2, WARN=3, ERROR=4
        match level {
            4 => tracing::error!(target: "llama.cpp", "{msg}"),
            3 => tracing::warn!(target: "llama.cpp", "{msg}"),
            2 => tracing::debug!(target: "llama.cpp", "{msg}"),
            _ => tracing::trace!(target: "llama.cpp", "{msg}"),
        }
    }

    unsafe {
        llama_sys::llama_log_set(Some(cb), std::ptr::null_mut());
    }
}
