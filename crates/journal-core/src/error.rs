use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Failed to load model from '{path}': {reason}")]
    ModelLoadFailed { path: String, reason: String },

    #[error("Failed to create context: {0}")]
    ContextCreationFailed(String),

    #[error("Decode failed with code {0}")]
    DecodeFailed(i32),

    #[error("Tokenization failed: {0}")]
    TokenizationFailed(String),

    #[error("Prompt produced no tokens")]
    EmptyPrompt,

    #[error("Invalid or freed model handle")]
    InvalidHandle,

    #[error("Transcription failed with code {0}")]
    TranscriptionFailed(i32),

    #[error("Failed to load audio from '{path}': {reason}")]
    AudioLoadFailed { path: String, reason: String },

    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    #[error("Null pointer from FFI call")]
    NullPointer,
}

pub type Result<T> = std::result::Result<T, BridgeError>;
