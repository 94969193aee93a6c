//! On-device text generation and speech transcription.
//!
//! [`TextEngine`] runs greedy generation against loaded text models and
//! [`SpeechEngine`] runs single-pass transcription against acoustic
//! models. Both are generic over the capability traits in [`provider`];
//! the `llama` and `whisper` features supply llama.cpp / whisper.cpp
//! implementations, which the C ABI in [`ffi`] exports.

pub mod audio;
pub mod batch;
pub mod context;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod generate;
pub mod guard;
pub mod handle;
pub mod journal;
pub mod provider;
pub mod sampler;
pub mod transcribe;

#[cfg(feature = "llama")]
pub mod llama;
#[cfg(feature = "whisper")]
pub mod whisper;

pub use audio::{AudioBuffer, SAMPLE_RATE, load_wav};
pub use batch::{Batch, BatchEntry};
pub use context::ContextParams;
pub use engine::{SpeechEngine, TextEngine};
pub use error::{BridgeError, Result};
pub use generate::{FinishReason, GenerateRequest, Generation};
pub use handle::Handle;
pub use journal::Mood;
pub use provider::{Decoder, SpeechBackend, SpeechModel, TextBackend, Token, Vocabulary};
pub use sampler::SamplingParams;
pub use transcribe::{FullParams, SpeechParams, Transcript};
