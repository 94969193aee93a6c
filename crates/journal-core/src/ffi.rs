//! C ABI over process-wide engine instances.
//!
//! Handles are the packed `u64` form of [`Handle`]; `0` is the null
//! handle. Load failures return `0`, every other failure returns an empty
//! string. Null pointers and strings that are not valid UTF-8 count as
//! failures. Strings returned here must be released with
//! [`journal_string_free`].
//!
//! The exported symbols are thin wrappers over the generic adapters below
//! (`text_load`, `text_generate`, ...), which work with any engine.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;

use tracing::{debug, error};

use crate::engine::{SpeechEngine, TextEngine};
use crate::handle::Handle;
use crate::provider::{SpeechBackend, TextBackend};

/// Borrow a C string as `&str`, `None` for null or invalid UTF-8.
///
/// # Safety
///
/// `ptr` must be null or point at a NUL-terminated string that outlives `'a`.
unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    let text = unsafe { CStr::from_ptr(ptr) }.to_str();
    text.inspect_err(|e| debug!(error = %e, "Rejecting non-UTF-8 argument"))
        .ok()
}

/// # Safety
///
/// Same contract as [`str_arg`].
unsafe fn path_arg<'a>(ptr: *const c_char) -> Option<&'a Path> {
    unsafe { str_arg(ptr) }.map(Path::new)
}

/// Hand a Rust string to the caller. Interior NULs truncate the text.
fn into_c_string(text: String) -> *mut c_char {
    let bytes = match text.find('\0') {
        Some(nul) => text[..nul].to_owned(),
        None => text,
    };
    CString::new(bytes).unwrap_or_default().into_raw()
}

fn empty_c_string() -> *mut c_char {
    into_c_string(String::new())
}

/// Run `f`, turning a panic into `fallback` so it never unwinds into C.
fn guarded<T>(what: &str, fallback: T, f: impl FnOnce() -> T) -> T {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
        error!(call = what, "Panic caught at FFI boundary");
        fallback
    })
}

/// Free a string returned by `journal_*_generate` / `journal_*_transcribe`.
///
/// # Safety
///
/// `s` must be null or a pointer returned by this library that has not
/// been freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn journal_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

//  Adapters

/// Load a text model. Returns `0` on failure.
///
/// # Safety
///
/// `model_path` must be null or a valid NUL-terminated string.
pub unsafe fn text_load<B: TextBackend>(
    engine: &TextEngine<B>,
    model_path: *const c_char,
    context_size: i32,
    thread_count: i32,
) -> u64 {
    let Some(path) = (unsafe { path_arg(model_path) }) else {
        return 0;
    };
    guarded("text_load", 0, || {
        engine
            .load(path, context_size, thread_count)
            .map_or(0, Handle::to_raw)
    })
}

/// Greedy generation into a caller-owned C string, empty on any failure.
///
/// # Safety
///
/// `prompt` must be null or a valid NUL-terminated string.
pub unsafe fn text_generate<B: TextBackend>(
    engine: &TextEngine<B>,
    handle: u64,
    prompt: *const c_char,
    max_tokens: i32,
    temperature: f32,
    top_p: f32,
) -> *mut c_char {
    let Some(handle) = Handle::from_raw(handle) else {
        return empty_c_string();
    };
    let Some(prompt) = (unsafe { str_arg(prompt) }) else {
        return empty_c_string();
    };
    let text = guarded("text_generate", String::new(), || {
        engine.generate(handle, prompt, max_tokens, temperature, top_p)
    });
    into_c_string(text)
}

pub fn text_free<B: TextBackend>(engine: &TextEngine<B>, handle: u64) {
    if let Some(handle) = Handle::from_raw(handle) {
        guarded("text_free", (), || engine.free(handle));
    }
}

/// Load an acoustic model. Returns `0` on failure.
///
/// # Safety
///
/// `model_path` must be null or a valid NUL-terminated string.
pub unsafe fn speech_load<B: SpeechBackend>(
    engine: &SpeechEngine<B>,
    model_path: *const c_char,
    thread_count: i32,
) -> u64 {
    let Some(path) = (unsafe { path_arg(model_path) }) else {
        return 0;
    };
    guarded("speech_load", 0, || {
        engine.load(path, thread_count).map_or(0, Handle::to_raw)
    })
}

/// Transcribe a 16 kHz WAV file, empty on any failure.
///
/// # Safety
///
/// `audio_path` must be null or a valid NUL-terminated string.
pub unsafe fn speech_transcribe<B: SpeechBackend>(
    engine: &SpeechEngine<B>,
    handle: u64,
    audio_path: *const c_char,
    thread_count: i32,
) -> *mut c_char {
    let Some(handle) = Handle::from_raw(handle) else {
        return empty_c_string();
    };
    let Some(path) = (unsafe { path_arg(audio_path) }) else {
        return empty_c_string();
    };
    let text = guarded("speech_transcribe", String::new(), || {
        engine.transcribe_file(handle, path, thread_count)
    });
    into_c_string(text)
}

pub fn speech_free<B: SpeechBackend>(engine: &SpeechEngine<B>, handle: u64) {
    if let Some(handle) = Handle::from_raw(handle) {
        guarded("speech_free", (), || engine.free(handle));
    }
}

#[cfg(feature = "llama")]
mod text {
    use std::sync::LazyLock;

    use super::*;
    use crate::llama::LlamaBackend;

    static ENGINE: LazyLock<TextEngine<LlamaBackend>> =
        LazyLock::new(|| TextEngine::new(LlamaBackend::default()));

    /// Load a GGUF model. Returns `0` on failure.
    ///
    /// # Safety
    ///
    /// `model_path` must be null or a valid NUL-terminated string.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn journal_text_load(
        model_path: *const c_char,
        context_size: i32,
        thread_count: i32,
    ) -> u64 {
        unsafe { text_load(&*ENGINE, model_path, context_size, thread_count) }
    }

    /// Greedy generation. `temperature` and `top_p` are ignored.
    ///
    /// # Safety
    ///
    /// `prompt` must be null or a valid NUL-terminated string.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn journal_text_generate(
        handle: u64,
        prompt: *const c_char,
        max_tokens: i32,
        temperature: f32,
        top_p: f32,
    ) -> *mut c_char {
        unsafe { text_generate(&*ENGINE, handle, prompt, max_tokens, temperature, top_p) }
    }

    #[unsafe(no_mangle)]
    pub extern "C" fn journal_text_free(handle: u64) {
        text_free(&*ENGINE, handle);
    }
}

#[cfg(feature = "whisper")]
mod speech {
    use std::sync::LazyLock;

    use super::*;
    use crate::whisper::WhisperBackend;

    static ENGINE: LazyLock<SpeechEngine<WhisperBackend>> =
        LazyLock::new(|| SpeechEngine::new(WhisperBackend));

    /// Load a whisper model. Returns `0` on failure.
    ///
    /// # Safety
    ///
    /// `model_path` must be null or a valid NUL-terminated string.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn journal_speech_load(model_path: *const c_char, thread_count: i32) -> u64 {
        unsafe { speech_load(&*ENGINE, model_path, thread_count) }
    }

    /// Transcribe a 16 kHz WAV file.
    ///
    /// # Safety
    ///
    /// `audio_path` must be null or a valid NUL-terminated string.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn journal_speech_transcribe(
        handle: u64,
        audio_path: *const c_char,
        thread_count: i32,
    ) -> *mut c_char {
        unsafe { speech_transcribe(&*ENGINE, handle, audio_path, thread_count) }
    }

    #[unsafe(no_mangle)]
    pub extern "C" fn journal_speech_free(handle: u64) {
        speech_free(&*ENGINE, handle);
    }
}

#[cfg(feature = "llama")]
pub use text::{journal_text_free, journal_text_generate, journal_text_load};

#[cfg(feature = "whisper")]
pub use speech::{journal_speech_free, journal_speech_load, journal_speech_transcribe};
