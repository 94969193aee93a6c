//! Engine instances: model registries plus their serialization guards.
//!
//! Each engine owns its own guard, so independent instances (for example
//! in tests) never contend with each other. Within one instance, at most
//! one generation (or one transcription) runs at any time, whichever
//! handle it targets.
//!
//! Two surfaces are offered: `try_*` methods return [`Result`] and keep
//! failure modes distinct; the plain methods collapse every failure into
//! an empty string, which is what boundary callers expect.

use std::path::Path;
use std::sync::PoisonError;

use tracing::{debug, info, warn};

use crate::audio::{self, AudioBuffer};
use crate::context::ContextParams;
use crate::error::{BridgeError, Result};
use crate::generate::{GenerateRequest, Generation, generate_blocking};
use crate::guard::SerialGuard;
use crate::handle::{Handle, Registry};
use crate::provider::{SpeechBackend, TextBackend};
use crate::sampler::SamplingParams;
use crate::transcribe::{SpeechParams, Transcript, transcribe_blocking};

//  Text generation

pub struct TextEngine<B: TextBackend> {
    backend: B,
    models: Registry<B::Model>,
    guard: SerialGuard,
}

impl<B: TextBackend> TextEngine<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            models: Registry::new(),
            guard: SerialGuard::new("text"),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Load a model and create its evaluation context.
    pub fn try_load(&self, path: &Path, context_size: i32, thread_count: i32) -> Result<Handle> {
        let params = ContextParams::new(context_size, thread_count);
        let model = self.backend.load(path, &params)?;
        let handle = self.models.insert(model);
        info!(
            path = %path.display(),
            n_ctx = params.n_ctx,
            n_threads = params.n_threads,
            handle = handle.to_raw(),
            "Text model ready"
        );
        Ok(handle)
    }

    /// [`try_load`](Self::try_load) with failures logged and dropped.
    pub fn load(&self, path: &Path, context_size: i32, thread_count: i32) -> Option<Handle> {
        self.try_load(path, context_size, thread_count)
            .inspect_err(|e| warn!(path = %path.display(), error = %e, "Text model load failed"))
            .ok()
    }

    pub fn try_generate(&self, handle: Handle, request: &GenerateRequest) -> Result<Generation> {
        let _serial = self.guard.enter();
        let model = self.models.get(handle).ok_or(BridgeError::InvalidHandle)?;
        let mut ctx = model.lock().unwrap_or_else(PoisonError::into_inner);
        generate_blocking(&mut *ctx, request)
    }

    /// Generate text, returning an empty string on any failure.
    ///
    /// `temperature` and `top_p` are accepted for signature compatibility;
    /// selection is greedy regardless. A negative `max_tokens` behaves as 0.
    pub fn generate(
        &self,
        handle: Handle,
        prompt: &str,
        max_tokens: i32,
        temperature: f32,
        top_p: f32,
    ) -> String {
        let request = GenerateRequest {
            prompt: prompt.to_owned(),
            max_tokens: max_tokens.max(0) as u32,
            sampling_params: SamplingParams { temperature, top_p },
        };
        match self.try_generate(handle, &request) {
            Ok(generation) => generation.text,
            Err(e) => {
                debug!(error = %e, "Generation produced no output");
                String::new()
            }
        }
    }

    /// Release a model. Unknown or already-freed handles are ignored.
    ///
    /// A call still running against `handle` keeps the model alive until
    /// it returns; the model is dropped by whichever side finishes last.
    pub fn free(&self, handle: Handle) {
        match self.models.remove(handle) {
            Some(_) => info!(handle = handle.to_raw(), "Text model freed"),
            None => debug!(handle = handle.to_raw(), "Ignoring free of unknown handle"),
        }
    }

    pub fn live_models(&self) -> usize {
        self.models.len()
    }
}

//  Transcription

pub struct SpeechEngine<B: SpeechBackend> {
    backend: B,
    models: Registry<B::Model>,
    guard: SerialGuard,
}

impl<B: SpeechBackend> SpeechEngine<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            models: Registry::new(),
            guard: SerialGuard::new("speech"),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn try_load(&self, path: &Path, thread_count: i32) -> Result<Handle> {
        let params = SpeechParams::new(thread_count);
        let model = self.backend.load(path, &params)?;
        let handle = self.models.insert(model);
        info!(path = %path.display(), handle = handle.to_raw(), "Speech model ready");
        Ok(handle)
    }

    pub fn load(&self, path: &Path, thread_count: i32) -> Option<Handle> {
        self.try_load(path, thread_count)
            .inspect_err(|e| warn!(path = %path.display(), error = %e, "Speech model load failed"))
            .ok()
    }

    pub fn try_transcribe(
        &self,
        handle: Handle,
        audio: &AudioBuffer,
        thread_count: i32,
    ) -> Result<Transcript> {
        let _serial = self.guard.enter();
        let model = self.models.get(handle).ok_or(BridgeError::InvalidHandle)?;
        let mut model = model.lock().unwrap_or_else(PoisonError::into_inner);
        transcribe_blocking(&mut *model, audio, thread_count)
    }

    /// Decode `audio_path` and transcribe it under the guard.
    pub fn try_transcribe_file(
        &self,
        handle: Handle,
        audio_path: &Path,
        thread_count: i32,
    ) -> Result<Transcript> {
        let _serial = self.guard.enter();
        let model = self.models.get(handle).ok_or(BridgeError::InvalidHandle)?;
        let audio = audio::load_wav(audio_path)?;
        let mut model = model.lock().unwrap_or_else(PoisonError::into_inner);
        transcribe_blocking(&mut *model, &audio, thread_count)
    }

    /// Transcribe decoded samples, returning an empty string on any failure.
    pub fn transcribe(&self, handle: Handle, audio: &AudioBuffer, thread_count: i32) -> String {
        self.try_transcribe(handle, audio, thread_count)
            .map(|t| t.text)
            .unwrap_or_else(|e| {
                debug!(error = %e, "Transcription produced no output");
                String::new()
            })
    }

    /// Transcribe a WAV file, returning an empty string on any failure.
    pub fn transcribe_file(&self, handle: Handle, audio_path: &Path, thread_count: i32) -> String {
        self.try_transcribe_file(handle, audio_path, thread_count)
            .map(|t| t.text)
            .unwrap_or_else(|e| {
                debug!(error = %e, "Transcription produced no output");
                String::new()
            })
    }

    pub fn free(&self, handle: Handle) {
        match self.models.remove(handle) {
            Some(_) => info!(handle = handle.to_raw(), "Speech model freed"),
            None => debug!(handle = handle.to_raw(), "Ignoring free of unknown handle"),
        }
    }

    pub fn live_models(&self) -> usize {
        self.models.len()
    }
}
