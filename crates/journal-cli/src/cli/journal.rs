//! `summarize` and `mood`: the journal helpers on top of text generation.

use std::io::Read;
use std::path::Path;

use tracing::info;

use journal_core::{TextEngine, journal};

use crate::backend;
use crate::cli::EntryArgs;
use crate::config::AppConfig;

pub async fn summarize(args: EntryArgs, config_path: &Path) -> anyhow::Result<()> {
    let summary = run(args, config_path, |engine, handle, entry| {
        journal::summarize(engine, handle, entry)
    })
    .await?;
    if summary.is_empty() {
        anyhow::bail!("The model produced no summary");
    }
    println!("{summary}");
    Ok(())
}

pub async fn mood(args: EntryArgs, config_path: &Path) -> anyhow::Result<()> {
    let mood = run(args, config_path, |engine, handle, entry| {
        journal::mood(engine, handle, entry)
    })
    .await?;
    match mood {
        Some(mood) => println!("{mood}"),
        None => anyhow::bail!("The model's answer named no known mood"),
    }
    Ok(())
}

/// Load the text model, run `task` on the entry, and free the model again.
async fn run<T, F>(args: EntryArgs, config_path: &Path, task: F) -> anyhow::Result<T>
where
    T: Send + 'static,
    F: FnOnce(&TextEngine<backend::Text>, journal_core::Handle, &str) -> T + Send + 'static,
{
    let cfg = AppConfig::load_or_default(config_path)?;
    let settings = args.model.resolve(&cfg)?;
    let entry = match args.entry {
        Some(entry) => entry,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    if entry.trim().is_empty() {
        anyhow::bail!("Journal entry is empty");
    }

    info!(model = %settings.model.display(), chars = entry.len(), "Loading model for journal entry…");

    let output = tokio::task::spawn_blocking(move || -> anyhow::Result<T> {
        let engine = TextEngine::new(backend::Text::default());
        let handle = engine.try_load(&settings.model, settings.ctx_size, settings.threads)?;
        let output = task(&engine, handle, &entry);
        engine.free(handle);
        Ok(output)
    })
    .await??;
    Ok(output)
}
