mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use common::{TEXTLESS, ToyBackend, write_model};
use journal_core::{BridgeError, FinishReason, GenerateRequest, Handle, TextEngine};

fn engine_with_model(n_ctx: i32) -> (TextEngine<ToyBackend>, Handle, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let engine = TextEngine::new(ToyBackend::default());
    let path = write_model(dir.path(), "toy.bin");
    let handle = engine.load(&path, n_ctx, 1).expect("toy model loads");
    (engine, handle, dir)
}

#[test]
fn hello_continuation_matches_recorded_output() {
    let (engine, handle, _dir) = engine_with_model(64);
    assert_eq!(engine.generate(handle, "Hello", 5, 0.7, 0.9), "pqrst");
}

#[test]
fn small_context_returns_partial_output() {
    let (engine, handle, _dir) = engine_with_model(8);
    let out = engine
        .try_generate(handle, &GenerateRequest::new("Hello", 5))
        .unwrap();
    assert_eq!(out.text, "pqr");
    assert_eq!(out.finish_reason, FinishReason::DecodeFailed(1));
    assert_eq!(engine.generate(handle, "Hello", 5, 0.0, 1.0), "pqr");
}

#[test]
fn never_exceeds_max_tokens() {
    let (engine, handle, _dir) = engine_with_model(64);
    for max in 0..8 {
        let out = engine
            .try_generate(handle, &GenerateRequest::new("a", max))
            .unwrap();
        assert!(out.completion_tokens <= max);
        assert_eq!(out.text.len() as u32, out.completion_tokens);
        assert_eq!(out.finish_reason, FinishReason::Length);
    }
}

#[test]
fn stops_early_on_eos() {
    let (engine, handle, _dir) = engine_with_model(64);
    let out = engine
        .try_generate(handle, &GenerateRequest::new("xy", 10))
        .unwrap();
    assert_eq!(out.text, "z");
    assert_eq!(out.finish_reason, FinishReason::Stop);
}

#[test]
fn zero_max_tokens_primes_only() {
    let (engine, handle, _dir) = engine_with_model(64);
    let probe = engine.backend().probe.clone();
    assert_eq!(engine.generate(handle, "Hello", 0, 0.0, 1.0), "");
    assert_eq!(probe.decode_log.lock().unwrap().len(), 1);
}

#[test]
fn negative_max_tokens_behaves_as_zero() {
    let (engine, handle, _dir) = engine_with_model(64);
    assert_eq!(engine.generate(handle, "Hello", -3, 0.0, 1.0), "");
}

#[test]
fn greedy_output_is_deterministic_and_ignores_sampling_knobs() {
    let (engine, handle, _dir) = engine_with_model(64);
    let first = engine.generate(handle, "Hello", 6, 0.0, 1.0);
    let second = engine.generate(handle, "Hello", 6, 1.5, 0.1);
    assert_eq!(first, "pqrstu");
    assert_eq!(first, second);
}

#[test]
fn each_call_starts_from_position_zero() {
    let (engine, handle, _dir) = engine_with_model(16);
    // Positions are checked by the toy model; a leftover cache would
    // make the second priming pass fail.
    for _ in 0..3 {
        assert_eq!(engine.generate(handle, "abc", 3, 0.0, 1.0), "def");
    }
}

#[test]
fn unresolvable_token_ends_generation() {
    let (engine, handle, _dir) = engine_with_model(64);
    let out = engine
        .try_generate(handle, &GenerateRequest::new("hi!", 4))
        .unwrap();
    assert_eq!(out.text, "");
    assert_eq!(out.finish_reason, FinishReason::Unresolvable(TEXTLESS));
}

#[test]
fn empty_and_untokenizable_prompts_give_empty_text() {
    let (engine, handle, _dir) = engine_with_model(64);
    assert!(matches!(
        engine.try_generate(handle, &GenerateRequest::new("", 4)),
        Err(BridgeError::EmptyPrompt)
    ));
    assert_eq!(engine.generate(handle, "", 4, 0.0, 1.0), "");
    assert_eq!(engine.generate(handle, "héllo", 4, 0.0, 1.0), "");
}

#[test]
fn load_failure_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    let engine = TextEngine::new(ToyBackend::default());
    assert!(engine.load(&dir.path().join("missing.bin"), 64, 1).is_none());

    let junk = dir.path().join("junk.bin");
    std::fs::write(&junk, "not a model").unwrap();
    assert!(matches!(
        engine.try_load(&junk, 64, 1),
        Err(BridgeError::ModelLoadFailed { .. })
    ));
    assert_eq!(engine.live_models(), 0);
}

#[test]
fn freed_handle_is_invalid_and_has_no_effect() {
    let (engine, handle, _dir) = engine_with_model(64);
    let probe = engine.backend().probe.clone();
    engine.free(handle);
    assert_eq!(probe.live.load(Ordering::SeqCst), 0);

    let before = probe.decode_log.lock().unwrap().len();
    assert!(matches!(
        engine.try_generate(handle, &GenerateRequest::new("Hello", 5)),
        Err(BridgeError::InvalidHandle)
    ));
    assert_eq!(engine.generate(handle, "Hello", 5, 0.0, 1.0), "");
    assert_eq!(probe.decode_log.lock().unwrap().len(), before);
}

#[test]
fn double_free_does_not_disturb_later_loads() {
    let (engine, handle, dir) = engine_with_model(64);
    engine.free(handle);
    engine.free(handle);
    assert_eq!(engine.live_models(), 0);

    let path = write_model(dir.path(), "other.bin");
    let fresh = engine.load(&path, 64, 1).unwrap();
    assert_ne!(fresh, handle);
    assert_eq!(engine.generate(fresh, "Hello", 5, 0.0, 1.0), "pqrst");
    // The stale handle must not reach the model now living in its slot.
    engine.free(handle);
    assert_eq!(engine.live_models(), 1);
    assert_eq!(engine.generate(handle, "Hello", 5, 0.0, 1.0), "");
}

#[test]
fn free_during_generation_waits_for_the_call() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Arc::new(TextEngine::new(ToyBackend::with_delay(Duration::from_millis(20))));
    let path = write_model(dir.path(), "toy.bin");
    let handle = engine.load(&path, 64, 1).unwrap();
    let probe = engine.backend().probe.clone();

    let worker = {
        let engine = engine.clone();
        std::thread::spawn(move || engine.generate(handle, "Hello", 5, 0.0, 1.0))
    };
    while probe.decode_log.lock().unwrap().is_empty() {
        std::thread::yield_now();
    }
    engine.free(handle);

    assert_eq!(worker.join().unwrap(), "pqrst");
    assert_eq!(probe.live.load(Ordering::SeqCst), 0);
}

#[test]
fn concurrent_generations_are_serialized() {
    let dir = tempfile::tempdir().unwrap();
    let delay = Duration::from_millis(10);
    let engine = Arc::new(TextEngine::new(ToyBackend::with_delay(delay)));
    let a = engine.load(&write_model(dir.path(), "a.bin"), 64, 1).unwrap();
    let b = engine.load(&write_model(dir.path(), "b.bin"), 64, 1).unwrap();

    // Each call: one priming decode + three feed-back decodes.
    let per_call = delay * 4;
    let started = Instant::now();
    let workers: Vec<_> = [a, b]
        .into_iter()
        .map(|handle| {
            let engine = engine.clone();
            std::thread::spawn(move || engine.generate(handle, "abc", 3, 0.0, 1.0))
        })
        .collect();
    for worker in workers {
        assert_eq!(worker.join().unwrap(), "def");
    }
    let elapsed = started.elapsed();

    let probe = &engine.backend().probe;
    assert_eq!(probe.peak.load(Ordering::SeqCst), 1);
    assert!(elapsed >= per_call * 2, "elapsed {elapsed:?}");

    // Decode steps of the two calls never interleave.
    let log = probe.decode_log.lock().unwrap();
    let switches = log.windows(2).filter(|w| w[0] != w[1]).count();
    assert_eq!(switches, 1, "decode log {log:?}");
}

#[test]
fn independent_engines_do_not_share_a_guard() {
    let dir = tempfile::tempdir().unwrap();
    let delay = Duration::from_millis(30);
    let first = Arc::new(TextEngine::new(ToyBackend::with_delay(delay)));
    let second = Arc::new(TextEngine::new(ToyBackend::with_delay(delay)));
    let h1 = first.load(&write_model(dir.path(), "1.bin"), 64, 1).unwrap();
    let h2 = second.load(&write_model(dir.path(), "2.bin"), 64, 1).unwrap();

    let t1 = {
        let engine = first.clone();
        std::thread::spawn(move || engine.generate(h1, "abc", 2, 0.0, 1.0))
    };
    let t2 = {
        let engine = second.clone();
        std::thread::spawn(move || engine.generate(h2, "abc", 2, 0.0, 1.0))
    };
    assert_eq!(t1.join().unwrap(), "de");
    assert_eq!(t2.join().unwrap(), "de");
}
