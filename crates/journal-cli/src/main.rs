mod backend;
mod cli;
mod config;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    //  Logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,journal_ai=debug,journal_core=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Cli::parse();
    let config_path = args
        .global
        .config
        .clone()
        .unwrap_or_else(AppConfig::default_path);

    match args.command {
        cli::Commands::Generate(a) => cli::generate::execute(a, &config_path).await,
        cli::Commands::Transcribe(a) => cli::transcribe::execute(a, &config_path).await,
        cli::Commands::Summarize(a) => cli::journal::summarize(a, &config_path).await,
        cli::Commands::Mood(a) => cli::journal::mood(a, &config_path).await,
        cli::Commands::Config(c) => cli::config_cmd::execute(c, &config_path),
    }
}
