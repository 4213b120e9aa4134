//! In-process turn pipeline
//!
//! Runs the three speech collaborators in strict sequence: transcribe →
//! generate reply → synthesize. Any stage's failure aborts the turn. The
//! pipeline is explicitly constructed from [`Config`] and passed down;
//! there is no process-wide API client singleton.

use async_trait::async_trait;

use crate::config::Config;
use crate::history::ConversationEntry;
use crate::persona::CoachPersona;
use crate::turn::{TurnOutcome, TurnService};
use crate::voice::{ReplyGenerator, SpeechToText, TextToSpeech};
use crate::Result;

/// Turn service running transcription, reply generation, and synthesis
/// in-process
pub struct TurnPipeline {
    stt: SpeechToText,
    reply: ReplyGenerator,
    tts: TextToSpeech,
    persona: CoachPersona,
    history_cap: usize,
}

impl TurnPipeline {
    /// Build the pipeline from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not configured
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.require_openai_key()?;

        Ok(Self {
            stt: SpeechToText::new(api_key.clone(), config.voice.stt_model.clone())?,
            reply: ReplyGenerator::new(api_key.clone(), config.voice.reply_model.clone())?,
            tts: TextToSpeech::new(
                api_key,
                config.voice.tts_voice.clone(),
                config.voice.tts_speed,
                config.voice.tts_model.clone(),
            )?,
            persona: config.persona.clone(),
            history_cap: config.history.cap,
        })
    }
}

#[async_trait]
impl TurnService for TurnPipeline {
    async fn process_turn(
        &self,
        audio: Vec<u8>,
        history: &[ConversationEntry],
    ) -> Result<TurnOutcome> {
        // Enforce the server-side cap regardless of what the client sent
        let start = history.len().saturating_sub(self.history_cap);
        let window = &history[start..];

        let transcript = self.stt.transcribe(&audio).await?;

        let reply_text = self
            .reply
            .generate(&self.persona.instructions(), window, &transcript)
            .await?;

        let reply_audio = self.tts.synthesize(&reply_text).await?;

        Ok(TurnOutcome {
            audio: reply_audio,
            transcript,
            reply_text,
        })
    }
}
