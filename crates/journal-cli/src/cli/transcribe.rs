use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use tracing::info;

use journal_core::{SpeechEngine, Transcript};

use crate::backend;
use crate::cli::TranscribeArgs;
use crate::config::AppConfig;

pub async fn execute(args: TranscribeArgs, config_path: &Path) -> anyhow::Result<()> {
    let cfg = AppConfig::load_or_default(config_path)?;
    let model = args
        .model
        .or(cfg.speech_model)
        .context("No speech model given; pass --model or run `journal-ai config set speech_model <path>`")?;
    let threads = args.threads.unwrap_or(cfg.threads);
    let audio = args.audio;

    info!(model = %model.display(), audio = %audio.display(), "Transcribing…");

    let started = Instant::now();
    let transcript = tokio::task::spawn_blocking(move || -> anyhow::Result<Transcript> {
        let engine = SpeechEngine::new(backend::Speech::default());
        let handle = engine.try_load(&model, threads)?;
        let result = engine.try_transcribe_file(handle, &audio, threads);
        engine.free(handle);
        Ok(result?)
    })
    .await??;

    println!("{}", transcript.text.trim());
    eprintln!(
        "  [segments: {} | {:.2}s]",
        transcript.n_segments,
        started.elapsed().as_secs_f64()
    );
    Ok(())
}
