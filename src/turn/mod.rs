//! Turn processing: state machine, controller, and the turn-service seam
//!
//! A turn is one complete interaction cycle. [`TurnService`] is the seam to
//! the turn-processing collaborator: either the in-process
//! [`crate::pipeline::TurnPipeline`] or the remote
//! [`client::HttpTurnClient`]. The controller never knows which.

pub mod client;
pub mod controller;
pub mod state;

pub use client::HttpTurnClient;
pub use controller::TurnController;
pub use state::{TurnEvent, TurnState, transition};

use async_trait::async_trait;

use crate::Result;
use crate::history::ConversationEntry;

/// Successful result of processing one turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Synthesized reply audio (MP3)
    pub audio: Vec<u8>,

    /// Transcript of the user's utterance
    pub transcript: String,

    /// Generated reply text
    pub reply_text: String,
}

/// Processes one captured utterance plus a trailing history window
#[async_trait]
pub trait TurnService: Send + Sync {
    /// Process a turn: transcribe the audio, generate a coached reply with
    /// the given context, and synthesize the reply to audio
    ///
    /// # Errors
    ///
    /// Returns error if any stage fails; a failed turn produces no outcome.
    async fn process_turn(
        &self,
        audio: Vec<u8>,
        history: &[ConversationEntry],
    ) -> Result<TurnOutcome>;
}

#[async_trait]
impl TurnService for Box<dyn TurnService> {
    async fn process_turn(
        &self,
        audio: Vec<u8>,
        history: &[ConversationEntry],
    ) -> Result<TurnOutcome> {
        self.as_ref().process_turn(audio, history).await
    }
}
