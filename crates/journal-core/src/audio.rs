//! WAV decoding into normalized mono samples.

use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{BridgeError, Result};

/// Sample rate the acoustic model expects.
pub const SAMPLE_RATE: u32 = 16_000;

/// Decoded audio ready for transcription.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Channel count of the source. `samples` is always mono.
    pub channels: u16,
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

/// Read a WAV file from disk.
pub fn load_wav(path: &Path) -> Result<AudioBuffer> {
    let file = std::fs::File::open(path).map_err(|e| audio_error(path, e))?;
    decode_wav(std::io::BufReader::new(file), path)
}

/// Decode WAV data from any reader. `origin` is only used in errors.
pub fn decode_wav<R: Read>(reader: R, origin: &Path) -> Result<AudioBuffer> {
    let mut reader = hound::WavReader::new(reader).map_err(|e| audio_error(origin, e))?;
    let spec = reader.spec();

    if spec.sample_rate != SAMPLE_RATE {
        return Err(BridgeError::AudioLoadFailed {
            path: origin.display().to_string(),
            reason: format!("sample rate {} Hz, expected {SAMPLE_RATE} Hz", spec.sample_rate),
        });
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| audio_error(origin, e))?
        }
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| audio_error(origin, e))?,
    };

    let channels = spec.channels.max(1);
    let samples = if channels > 1 {
        interleaved
            .chunks(channels as usize)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    } else {
        interleaved
    };

    debug!(
        path = %origin.display(),
        channels,
        samples = samples.len(),
        "WAV decoded"
    );
    Ok(AudioBuffer {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        samples,
    })
}

fn audio_error(path: &Path, e: impl std::fmt::Display) -> BridgeError {
    BridgeError::AudioLoadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}
