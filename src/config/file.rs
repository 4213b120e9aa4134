//! TOML configuration file loading
//!
//! Supports `~/.config/parla/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ParlaConfigFile {
    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Conversation history bounds
    #[serde(default)]
    pub history: HistoryFileConfig,

    /// Coach persona overrides
    #[serde(default)]
    pub persona: PersonaFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,

    /// Remote turn endpoint configuration
    #[serde(default)]
    pub server: ServerFileConfig,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// STT model (e.g. "whisper-1")
    pub stt_model: Option<String>,

    /// Reply model (e.g. "gpt-4o-mini")
    pub reply_model: Option<String>,

    /// TTS model (e.g. "tts-1")
    pub tts_model: Option<String>,

    /// TTS voice identifier (e.g. "alloy")
    pub tts_voice: Option<String>,

    /// TTS speed multiplier
    pub tts_speed: Option<f32>,
}

/// Conversation history bounds
///
/// `cap` is the stored (server-side) bound; `request_window` is how many
/// trailing entries go out with each turn request. They are independent.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryFileConfig {
    pub cap: Option<usize>,
    pub request_window: Option<usize>,
}

/// Coach persona overrides
#[derive(Debug, Default, Deserialize)]
pub struct PersonaFileConfig {
    pub name: Option<String>,
    pub language: Option<String>,
    pub max_reply_sentences: Option<usize>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
}

/// Remote turn endpoint configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// URL of a remote turn-processing endpoint; when set, turns are
    /// uploaded there instead of running the in-process pipeline
    pub url: Option<String>,
}

impl ParlaConfigFile {
    /// Load from the given path, returning defaults if the file is absent
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load(path: &std::path::Path) -> crate::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let parsed = toml::from_str(&raw)?;
        tracing::debug!(path = %path.display(), "config file loaded");
        Ok(parsed)
    }
}
