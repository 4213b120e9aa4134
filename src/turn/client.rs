//! Remote turn endpoint client
//!
//! Uploads one captured utterance plus the serialized trailing history
//! window as a multipart form, and decodes the JSON response carrying the
//! base64 reply audio.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;

use super::{TurnOutcome, TurnService};
use crate::history::ConversationEntry;
use crate::{Error, Result};

/// Response from the remote turn endpoint
#[derive(Deserialize)]
struct TurnEndpointResponse {
    /// Base64-encoded MP3 reply audio
    audio: Option<String>,

    /// Transcript of the uploaded utterance
    transcript: String,

    /// Generated reply text
    #[serde(rename = "replyText")]
    reply_text: String,
}

/// Turn service backed by a remote HTTP endpoint
pub struct HttpTurnClient {
    client: reqwest::Client,
    url: String,
}

impl HttpTurnClient {
    /// Create a client for the given turn endpoint URL
    #[must_use]
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl TurnService for HttpTurnClient {
    async fn process_turn(
        &self,
        audio: Vec<u8>,
        history: &[ConversationEntry],
    ) -> Result<TurnOutcome> {
        tracing::debug!(
            audio_bytes = audio.len(),
            history_len = history.len(),
            url = %self.url,
            "uploading turn"
        );

        let history_json = serde_json::to_string(history)?;

        let form = reqwest::multipart::Form::new()
            .part(
                "audio",
                reqwest::multipart::Part::bytes(audio)
                    .file_name("utterance.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Turn(e.to_string()))?,
            )
            .text("history", history_json);

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "turn upload failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "turn endpoint error");
            return Err(Error::Turn(format!("turn endpoint error {status}: {body}")));
        }

        let result: TurnEndpointResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse turn response");
            e
        })?;

        // A missing audio payload is treated like any other remote failure
        let encoded = result
            .audio
            .ok_or_else(|| Error::Turn("response missing audio payload".to_string()))?;
        let reply_audio = BASE64
            .decode(encoded)
            .map_err(|e| Error::Turn(format!("invalid audio payload: {e}")))?;

        tracing::debug!(
            transcript = %result.transcript,
            reply_bytes = reply_audio.len(),
            "turn complete"
        );

        Ok(TurnOutcome {
            audio: reply_audio,
            transcript: result.transcript,
            reply_text: result.reply_text,
        })
    }
}
