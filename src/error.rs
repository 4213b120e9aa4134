//! Error types for Parla

use thiserror::Error;

/// Result type alias for Parla operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Parla
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Audio device or codec error
    #[error("audio error: {0}")]
    Audio(String),

    /// Recording finalize error (no captured audio available)
    #[error("recording error: {0}")]
    Recording(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Reply generation error
    #[error("reply error: {0}")]
    Reply(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Turn-processing error (remote endpoint or pipeline)
    #[error("turn error: {0}")]
    Turn(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
