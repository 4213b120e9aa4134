//! Coach persona configuration
//!
//! The reply generator's behavior (persona, target language, correction-first
//! style, bounded reply length) is carried in a fixed instruction preamble
//! built from this configuration; nothing about it is derived dynamically.

use serde::{Deserialize, Serialize};

/// Persona and style constraints for the conversation coach
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CoachPersona {
    /// Display name the coach uses for itself
    pub name: String,

    /// Language the user is practicing (e.g. "Spanish")
    pub language: String,

    /// Upper bound on reply length, in sentences
    pub max_reply_sentences: usize,
}

impl Default for CoachPersona {
    fn default() -> Self {
        Self {
            name: "Sofía".to_string(),
            language: "Spanish".to_string(),
            max_reply_sentences: 3,
        }
    }
}

impl CoachPersona {
    /// Build the fixed system-prompt preamble sent with every turn
    #[must_use]
    pub fn instructions(&self) -> String {
        format!(
            "You are {name}, a friendly {language} conversation coach. \
             Reply only in {language}. If the learner's last utterance \
             contains a mistake, start by gently giving the corrected \
             phrasing, then continue the conversation naturally. Ask a \
             simple follow-up question to keep the learner talking. Keep \
             every reply to at most {max} short sentences so it stays easy \
             to follow when spoken aloud.",
            name = self.name,
            language = self.language,
            max = self.max_reply_sentences,
        )
    }
}
