//! Configuration management for Parla

pub mod file;

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::history::{DEFAULT_CAP, DEFAULT_REQUEST_WINDOW};
use crate::persona::CoachPersona;
use crate::{Error, Result};
use file::ParlaConfigFile;

/// Parla runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Voice pipeline configuration
    pub voice: VoiceConfig,

    /// Conversation history bounds
    pub history: HistoryConfig,

    /// Coach persona and style constraints
    pub persona: CoachPersona,

    /// API keys
    pub api_keys: ApiKeys,

    /// Remote turn endpoint URL (in-process pipeline when unset)
    pub server_url: Option<String>,
}

/// Voice pipeline configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// STT model (e.g. "whisper-1")
    pub stt_model: String,

    /// Reply model for chat completions (e.g. "gpt-4o-mini")
    pub reply_model: String,

    /// TTS model (e.g. "tts-1")
    pub tts_model: String,

    /// TTS voice identifier
    pub tts_voice: String,

    /// TTS speed multiplier (0.25 to 4.0)
    pub tts_speed: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            stt_model: "whisper-1".to_string(),
            reply_model: "gpt-4o-mini".to_string(),
            tts_model: "tts-1".to_string(),
            tts_voice: "alloy".to_string(),
            tts_speed: 1.0,
        }
    }
}

/// Conversation history bounds
///
/// Two independent tunables: the stored cap (enforced by the buffer and
/// re-enforced by the pipeline) and the trailing window sent per request.
#[derive(Debug, Clone, Copy)]
pub struct HistoryConfig {
    /// Maximum entries kept in the buffer
    pub cap: usize,

    /// Trailing entries sent with each turn request
    pub request_window: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            cap: DEFAULT_CAP,
            request_window: DEFAULT_REQUEST_WINDOW,
        }
    }
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (Whisper, chat completions, TTS)
    pub openai: Option<String>,
}

impl Config {
    /// Load configuration: defaults ← config file ← environment
    ///
    /// # Errors
    ///
    /// Returns error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path();
        let overlay = match path {
            Some(ref p) => ParlaConfigFile::load(p)?,
            None => ParlaConfigFile::default(),
        };
        Ok(Self::from_overlay(overlay))
    }

    /// Default config file location (`~/.config/parla/config.toml` on Linux)
    #[must_use]
    pub fn config_file_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "parla", "parla")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply a file overlay and environment overrides on top of defaults
    #[must_use]
    pub fn from_overlay(overlay: ParlaConfigFile) -> Self {
        let voice_defaults = VoiceConfig::default();
        let voice = VoiceConfig {
            stt_model: overlay.voice.stt_model.unwrap_or(voice_defaults.stt_model),
            reply_model: overlay
                .voice
                .reply_model
                .unwrap_or(voice_defaults.reply_model),
            tts_model: overlay.voice.tts_model.unwrap_or(voice_defaults.tts_model),
            tts_voice: overlay.voice.tts_voice.unwrap_or(voice_defaults.tts_voice),
            tts_speed: overlay.voice.tts_speed.unwrap_or(voice_defaults.tts_speed),
        };

        let history_defaults = HistoryConfig::default();
        let history = HistoryConfig {
            cap: overlay.history.cap.unwrap_or(history_defaults.cap),
            request_window: overlay
                .history
                .request_window
                .unwrap_or(history_defaults.request_window),
        };

        let persona_defaults = CoachPersona::default();
        let persona = CoachPersona {
            name: overlay.persona.name.unwrap_or(persona_defaults.name),
            language: overlay.persona.language.unwrap_or(persona_defaults.language),
            max_reply_sentences: overlay
                .persona
                .max_reply_sentences
                .unwrap_or(persona_defaults.max_reply_sentences),
        };

        let api_keys = ApiKeys {
            openai: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.is_empty())
                .or(overlay.api_keys.openai),
        };

        let server_url = std::env::var("PARLA_SERVER_URL")
            .ok()
            .filter(|u| !u.is_empty())
            .or(overlay.server.url);

        Self {
            voice,
            history,
            persona,
            api_keys,
            server_url,
        }
    }

    /// The `OpenAI` key, required for the in-process pipeline
    ///
    /// # Errors
    ///
    /// Returns error if no key is configured.
    pub fn require_openai_key(&self) -> Result<String> {
        self.api_keys
            .openai
            .clone()
            .ok_or_else(|| Error::Config("OpenAI API key not configured".to_string()))
    }
}
