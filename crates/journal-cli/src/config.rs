//! Application configuration, persisted as JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Global configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// GGUF text model used by `generate`, `summarize` and `mood`.
    #[serde(default)]
    pub text_model: Option<PathBuf>,
    /// whisper.cpp model used by `transcribe`.
    #[serde(default)]
    pub speech_model: Option<PathBuf>,
    /// Context window in tokens.
    #[serde(default = "default_ctx_size")]
    pub ctx_size: i32,
    /// Worker threads (≤ 0 = all hardware threads).
    #[serde(default = "default_threads")]
    pub threads: i32,
    /// Default generation length.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: i32,
}

fn default_ctx_size() -> i32 {
    1024
}
fn default_threads() -> i32 {
    4
}
fn default_max_tokens() -> i32 {
    64
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            text_model: None,
            speech_model: None,
            ctx_size: default_ctx_size(),
            threads: default_threads(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl AppConfig {
    /// Platform config directory: `~/.config/journal-ai/`
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("journal-ai")
    }

    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.json")
    }

    /// Load from `path`, or return defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let data = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Persist to `path`, creating its directory.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Update one field from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "text_model" => self.text_model = optional_path(value),
            "speech_model" => self.speech_model = optional_path(value),
            "ctx_size" => self.ctx_size = value.parse()?,
            "threads" => self.threads = value.parse()?,
            "max_tokens" => self.max_tokens = value.parse()?,
            _ => anyhow::bail!("Unknown config key: {key}"),
        }
        Ok(())
    }
}

/// Empty string clears the path.
fn optional_path(value: &str) -> Option<PathBuf> {
    (!value.is_empty()).then(|| PathBuf::from(value))
}
