use std::path::Path;
use std::time::Instant;

use tracing::info;

use journal_core::{GenerateRequest, Generation, SamplingParams, TextEngine};

use crate::backend;
use crate::cli::GenerateArgs;
use crate::config::AppConfig;

pub async fn execute(args: GenerateArgs, config_path: &Path) -> anyhow::Result<()> {
    let cfg = AppConfig::load_or_default(config_path)?;
    let settings = args.model.resolve(&cfg)?;
    let max_tokens = args.max_tokens.unwrap_or(cfg.max_tokens).max(0) as u32;

    info!(model = %settings.model.display(), max_tokens, "Loading model for generation…");

    let request = GenerateRequest {
        prompt: args.prompt,
        max_tokens,
        sampling_params: SamplingParams {
            temperature: args.temp,
            top_p: args.top_p,
        },
    };

    let started = Instant::now();
    let generation = tokio::task::spawn_blocking(move || -> anyhow::Result<Generation> {
        let engine = TextEngine::new(backend::Text::default());
        let handle = engine.try_load(&settings.model, settings.ctx_size, settings.threads)?;
        let result = engine.try_generate(handle, &request);
        engine.free(handle);
        Ok(result?)
    })
    .await??;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&generation)?);
    } else {
        println!("{}", generation.text);
        eprintln!(
            "  [{} | prompt: {} tok, gen: {} tok, {:.2}s]",
            generation.finish_reason,
            generation.prompt_tokens,
            generation.completion_tokens,
            started.elapsed().as_secs_f64()
        );
    }
    Ok(())
}
