mod common;

use std::ffi::{CStr, CString, c_char};
use std::path::Path;

use common::{ToyBackend, ToySpeechBackend, write_model};
use journal_core::ffi::{
    journal_string_free, speech_free, speech_load, speech_transcribe, text_free, text_generate,
    text_load,
};
use journal_core::{SAMPLE_RATE, SpeechEngine, TextEngine};

/// Copy a returned string out and release it.
fn take(ptr: *mut c_char) -> String {
    assert!(!ptr.is_null());
    let text = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_owned();
    unsafe { journal_string_free(ptr) };
    text
}

fn c_path(path: &Path) -> CString {
    CString::new(path.to_str().unwrap()).unwrap()
}

fn loaded_text_engine(dir: &Path) -> (TextEngine<ToyBackend>, u64) {
    let engine = TextEngine::new(ToyBackend::default());
    let model = c_path(&write_model(dir, "toy.bin"));
    let handle = unsafe { text_load(&engine, model.as_ptr(), 64, 1) };
    assert_ne!(handle, 0);
    (engine, handle)
}

#[test]
fn generate_through_the_boundary() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, handle) = loaded_text_engine(dir.path());
    let prompt = CString::new("Hello").unwrap();

    let out = unsafe { text_generate(&engine, handle, prompt.as_ptr(), 5, 0.7, 0.9) };
    assert_eq!(take(out), "pqrst");
}

#[test]
fn null_handle_and_null_prompt_give_empty_text() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, handle) = loaded_text_engine(dir.path());
    let prompt = CString::new("Hello").unwrap();

    let out = unsafe { text_generate(&engine, 0, prompt.as_ptr(), 5, 0.0, 1.0) };
    assert_eq!(take(out), "");
    let out = unsafe { text_generate(&engine, handle, std::ptr::null(), 5, 0.0, 1.0) };
    assert_eq!(take(out), "");
    assert!(engine.backend().probe.decode_log.lock().unwrap().is_empty());
}

#[test]
fn non_utf8_prompt_gives_empty_text_without_decoding() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, handle) = loaded_text_engine(dir.path());
    let prompt = CStr::from_bytes_with_nul(b"\xffa\0").unwrap();

    let out = unsafe { text_generate(&engine, handle, prompt.as_ptr(), 5, 0.0, 1.0) };
    assert_eq!(take(out), "");
    assert!(engine.backend().probe.decode_log.lock().unwrap().is_empty());
}

#[test]
fn bad_model_paths_load_as_zero() {
    let dir = tempfile::tempdir().unwrap();
    let engine = TextEngine::new(ToyBackend::default());
    let missing = c_path(&dir.path().join("missing.bin"));
    let non_utf8 = CStr::from_bytes_with_nul(b"model\xfe.bin\0").unwrap();

    assert_eq!(unsafe { text_load(&engine, std::ptr::null(), 64, 1) }, 0);
    assert_eq!(unsafe { text_load(&engine, missing.as_ptr(), 64, 1) }, 0);
    assert_eq!(unsafe { text_load(&engine, non_utf8.as_ptr(), 64, 1) }, 0);
    assert_eq!(engine.live_models(), 0);
}

#[test]
fn freed_handle_gives_empty_text_and_double_free_is_harmless() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, handle) = loaded_text_engine(dir.path());
    let prompt = CString::new("Hello").unwrap();

    text_free(&engine, handle);
    text_free(&engine, handle);
    text_free(&engine, 0);
    assert_eq!(engine.live_models(), 0);

    let out = unsafe { text_generate(&engine, handle, prompt.as_ptr(), 5, 0.0, 1.0) };
    assert_eq!(take(out), "");
}

#[test]
fn transcribe_through_the_boundary() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("ggml-tiny.bin");
    std::fs::write(&model, b"acoustic").unwrap();
    let audio = dir.path().join("clip.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&audio, spec).unwrap();
    for _ in 0..320 {
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();

    let engine = SpeechEngine::new(ToySpeechBackend::default());
    let model = c_path(&model);
    let audio = c_path(&audio);
    let handle = unsafe { speech_load(&engine, model.as_ptr(), 2) };
    assert_ne!(handle, 0);

    let out = unsafe { speech_transcribe(&engine, handle, audio.as_ptr(), 2) };
    assert_eq!(take(out), " heard 320 samples");

    let out = unsafe { speech_transcribe(&engine, handle, std::ptr::null(), 2) };
    assert_eq!(take(out), "");
    let out = unsafe { speech_transcribe(&engine, 0, audio.as_ptr(), 2) };
    assert_eq!(take(out), "");

    speech_free(&engine, handle);
    speech_free(&engine, handle);
    let out = unsafe { speech_transcribe(&engine, handle, audio.as_ptr(), 2) };
    assert_eq!(take(out), "");
    assert_eq!(unsafe { speech_load(&engine, std::ptr::null(), 2) }, 0);
}
