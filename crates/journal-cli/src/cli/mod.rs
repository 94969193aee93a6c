pub mod config_cmd;
pub mod generate;
pub mod journal;
pub mod transcribe;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(
    name = "journal-ai",
    version,
    about = "On-device journal assistant powered by llama.cpp and whisper.cpp"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Args, Clone)]
pub struct GlobalArgs {
    /// Config file (default: platform config dir).
    #[arg(long, global = true, env = "JOURNAL_AI_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Greedy text generation from a prompt.
    Generate(GenerateArgs),

    /// Transcribe a 16 kHz WAV recording.
    Transcribe(TranscribeArgs),

    /// Summarize a journal entry in one or two sentences.
    Summarize(EntryArgs),

    /// Classify the mood of a journal entry.
    Mood(EntryArgs),

    /// View / edit configuration.
    Config(ConfigArgs),
}

//  Subcommand argument structs

/// Model and runtime overrides shared by the text commands.
#[derive(Debug, clap::Args, Clone)]
pub struct TextModelArgs {
    /// Path to a GGUF model (overrides `text_model`).
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Context size in tokens.
    #[arg(short = 'c', long)]
    pub ctx_size: Option<i32>,

    /// Number of CPU threads (≤ 0 = all hardware threads).
    #[arg(short, long)]
    pub threads: Option<i32>,
}

#[derive(Debug, clap::Args, Clone)]
pub struct GenerateArgs {
    /// Prompt text.
    pub prompt: String,

    #[command(flatten)]
    pub model: TextModelArgs,

    /// Maximum number of generated tokens.
    #[arg(short = 'n', long)]
    pub max_tokens: Option<i32>,

    /// Sampling temperature (accepted; selection is always greedy).
    #[arg(long, default_value_t = 0.0)]
    pub temp: f32,

    /// Nucleus threshold (accepted; selection is always greedy).
    #[arg(long, default_value_t = 1.0)]
    pub top_p: f32,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct TranscribeArgs {
    /// WAV file (16 kHz).
    pub audio: PathBuf,

    /// Path to a whisper.cpp model (overrides `speech_model`).
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Number of CPU threads (≤ 0 = 4).
    #[arg(short, long)]
    pub threads: Option<i32>,
}

#[derive(Debug, clap::Args, Clone)]
pub struct EntryArgs {
    /// Entry text; read from stdin when omitted.
    pub entry: Option<String>,

    #[command(flatten)]
    pub model: TextModelArgs,
}

#[derive(Debug, clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the current configuration.
    Show,

    /// Set a config value.
    Set {
        /// Key (e.g. text_model, speech_model, ctx_size, threads, max_tokens).
        key: String,
        /// Value (an empty string clears a model path).
        value: String,
    },

    /// Print the config file location.
    Path,
}

/// Text model settings after applying command-line overrides to the config.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSettings {
    pub model: PathBuf,
    pub ctx_size: i32,
    pub threads: i32,
}

impl TextModelArgs {
    pub fn resolve(&self, cfg: &AppConfig) -> anyhow::Result<TextSettings> {
        let model = self
            .model
            .clone()
            .or_else(|| cfg.text_model.clone())
            .context("No text model given; pass --model or run `journal-ai config set text_model <path>`")?;
        Ok(TextSettings {
            model,
            ctx_size: self.ctx_size.unwrap_or(cfg.ctx_size),
            threads: self.threads.unwrap_or(cfg.threads),
        })
    }
}
