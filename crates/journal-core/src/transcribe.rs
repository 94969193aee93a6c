//! Single-pass speech transcription.

use tracing::{debug, warn};

use crate::audio::AudioBuffer;
use crate::error::Result;
use crate::provider::SpeechModel;

/// Threads used for a transcription when the caller passes ≤ 0.
pub const DEFAULT_SPEECH_THREADS: i32 = 4;

/// Parameters for loading an acoustic model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechParams {
    /// Thread-count hint recorded at load time.
    pub n_threads: i32,
    /// Always `false`; transcription is CPU only.
    pub use_gpu: bool,
}

impl SpeechParams {
    pub fn new(thread_count: i32) -> Self {
        Self {
            n_threads: speech_threads(thread_count),
            use_gpu: false,
        }
    }
}

/// Parameters for one full-buffer inference pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullParams {
    pub n_threads: i32,
    pub print_progress: bool,
    pub print_realtime: bool,
    pub print_timestamps: bool,
    /// Do not carry text context over from earlier calls.
    pub no_context: bool,
    /// Force a single contiguous segment.
    pub single_segment: bool,
}

impl FullParams {
    /// Greedy, silent, stateless, single-segment.
    pub fn greedy(thread_count: i32) -> Self {
        Self {
            n_threads: speech_threads(thread_count),
            print_progress: false,
            print_realtime: false,
            print_timestamps: false,
            no_context: true,
            single_segment: true,
        }
    }
}

fn speech_threads(requested: i32) -> i32 {
    if requested > 0 {
        requested
    } else {
        DEFAULT_SPEECH_THREADS
    }
}

/// Result of one transcription call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transcript {
    pub text: String,
    pub n_segments: usize,
}

/// Run one inference pass over `audio` and concatenate the segment texts.
///
/// Multi-channel input is transcribed anyway; only a warning is logged.
/// An empty buffer yields an empty transcript without touching the model.
pub fn transcribe_blocking<M: SpeechModel>(
    model: &mut M,
    audio: &AudioBuffer,
    thread_count: i32,
) -> Result<Transcript> {
    if audio.channels != 1 {
        warn!(channels = audio.channels, "Only mono audio is supported");
    }
    if audio.samples.is_empty() {
        debug!("Empty sample buffer, nothing to transcribe");
        return Ok(Transcript::default());
    }

    let params = FullParams::greedy(thread_count);
    model.full(&audio.samples, &params)?;

    let segments = model.segments();
    let transcript = Transcript {
        n_segments: segments.len(),
        text: segments.concat(),
    };
    debug!(
        samples = audio.samples.len(),
        n_segments = transcript.n_segments,
        "Transcription finished"
    );
    Ok(transcript)
}
