//! Coached reply generation via the chat-completions API
//!
//! The system message is the persona's fixed instruction preamble; the
//! trailing history window and the new transcript follow as role/content
//! messages.

use serde::{Deserialize, Serialize};

use crate::history::ConversationEntry;
use crate::{Error, Result};

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Generates the coach's reply to a transcribed utterance
pub struct ReplyGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl ReplyGenerator {
    /// Create a new reply generator
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(api_key: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for reply generation".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        })
    }

    /// Generate a reply given the instruction preamble, trailing history
    /// window, and the transcript of the user's new utterance
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response has no choices
    pub async fn generate(
        &self,
        instructions: &str,
        history: &[ConversationEntry],
        transcript: &str,
    ) -> Result<String> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage {
            role: "system",
            content: instructions,
        });
        for entry in history {
            messages.push(ChatMessage {
                role: entry.role.as_str(),
                content: &entry.content,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: transcript,
        });

        tracing::debug!(
            history_len = history.len(),
            model = %self.model,
            "requesting reply"
        );

        let request = ChatRequest {
            model: &self.model,
            messages,
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "reply request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "reply API error");
            return Err(Error::Reply(format!("reply error {status}: {body}")));
        }

        let result: ChatResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse reply response");
            e
        })?;

        let reply = result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Reply("response contained no choices".to_string()))?;

        tracing::info!(reply = %reply, "reply generated");
        Ok(reply)
    }
}
