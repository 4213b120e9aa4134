//! Conversation history buffer
//!
//! A bounded sliding window of exchanged utterances. The trailing window is
//! serialized into each turn request to give the reply generator short-term
//! context without unbounded growth.

use serde::{Deserialize, Serialize};

/// Default stored capacity (server-side bound)
pub const DEFAULT_CAP: usize = 12;

/// Default number of trailing entries sent per turn request (client-side bound)
pub const DEFAULT_REQUEST_WINDOW: usize = 6;

/// Who said an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Wire name used in chat-completion message lists
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One utterance in the conversation, immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    /// Speaker role
    pub role: Role,

    /// Utterance text
    pub content: String,
}

impl ConversationEntry {
    /// Create a user entry
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant entry
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered log of conversation entries, capped to a sliding window
///
/// Insertion order is chronological order. Once the cap is exceeded the
/// oldest entries are silently dropped (FIFO eviction). Owned by a single
/// session; not persisted across restarts.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    entries: Vec<ConversationEntry>,
    cap: usize,
}

impl ConversationHistory {
    /// Create an empty history with the given capacity
    #[must_use]
    pub const fn new(cap: usize) -> Self {
        Self {
            entries: Vec::new(),
            cap,
        }
    }

    /// Append an entry, evicting from the front if the cap is exceeded
    pub fn append(&mut self, entry: ConversationEntry) {
        self.entries.push(entry);
        if self.entries.len() > self.cap {
            let excess = self.entries.len() - self.cap;
            self.entries.drain(..excess);
        }
    }

    /// Last `n` entries in original order (fewer if the buffer holds fewer)
    #[must_use]
    pub fn window(&self, n: usize) -> &[ConversationEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    /// All entries in chronological order
    #[must_use]
    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    /// Number of stored entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the buffer is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored capacity
    #[must_use]
    pub const fn cap(&self) -> usize {
        self.cap
    }

    /// Serialize to a JSON array of `{role, content}` objects
    ///
    /// Lossless for any history composed of valid entries.
    #[must_use]
    pub fn serialize(&self) -> String {
        // Entries are plain serde structs; serialization cannot fail.
        serde_json::to_string(&self.entries).unwrap_or_else(|_| "[]".to_string())
    }

    /// Deserialize from a JSON array, defensively
    ///
    /// Non-array or malformed input yields an empty history rather than an
    /// error. Individual entries with an unknown role or missing fields are
    /// discarded; valid entries are kept in their original order, trimmed to
    /// the cap from the front.
    #[must_use]
    pub fn deserialize(input: &str, cap: usize) -> Self {
        let mut history = Self::new(cap);

        let Ok(serde_json::Value::Array(items)) = serde_json::from_str::<serde_json::Value>(input)
        else {
            tracing::debug!("malformed history payload, defaulting to empty");
            return history;
        };

        for item in items {
            match serde_json::from_value::<ConversationEntry>(item) {
                Ok(entry) => history.append(entry),
                Err(e) => tracing::debug!(error = %e, "discarding invalid history entry"),
            }
        }

        history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_evicts_oldest() {
        let mut history = ConversationHistory::new(3);
        history.append(ConversationEntry::user("a"));
        history.append(ConversationEntry::assistant("b"));
        history.append(ConversationEntry::user("c"));
        history.append(ConversationEntry::assistant("d"));

        assert_eq!(history.len(), 3);
        assert_eq!(history.entries()[0].content, "b");
        assert_eq!(history.entries()[2].content, "d");
    }

    #[test]
    fn test_window_bounds() {
        let mut history = ConversationHistory::new(12);
        for i in 0..5 {
            history.append(ConversationEntry::user(format!("m{i}")));
        }

        assert_eq!(history.window(3).len(), 3);
        assert_eq!(history.window(3)[0].content, "m2");
        assert_eq!(history.window(10).len(), 5);
        assert_eq!(history.window(0).len(), 0);
    }

    #[test]
    fn test_deserialize_malformed_defaults_empty() {
        assert!(ConversationHistory::deserialize("not json", 12).is_empty());
        assert!(ConversationHistory::deserialize("{\"role\":\"user\"}", 12).is_empty());
        assert!(ConversationHistory::deserialize("42", 12).is_empty());
    }

    #[test]
    fn test_deserialize_discards_invalid_entries() {
        let input = r#"[
            {"role": "user", "content": "hola"},
            {"role": "narrator", "content": "nope"},
            {"content": "missing role"},
            {"role": "assistant", "content": "buenas"}
        ]"#;

        let history = ConversationHistory::deserialize(input, 12);
        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[0].role, Role::User);
        assert_eq!(history.entries()[1].role, Role::Assistant);
        assert_eq!(history.entries()[1].content, "buenas");
    }

    #[test]
    fn test_serialize_roundtrip() {
        let mut history = ConversationHistory::new(12);
        history.append(ConversationEntry::user("¿Qué tal?"));
        history.append(ConversationEntry::assistant("Muy bien, ¿y tú?"));

        let restored = ConversationHistory::deserialize(&history.serialize(), 12);
        assert_eq!(restored.entries(), history.entries());
    }
}
