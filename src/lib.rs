//! Parla - push-to-talk language practice with an AI conversation coach
//!
//! One practice turn flows through a small state machine:
//!
//! ```text
//!            press_down              press_up
//!   ┌──────┐ ─────────▶ ┌───────────┐ ─────────▶ ┌───────────┐
//!   │ Idle │            │ Listening │            │ Uploading │
//!   └──────┘ ◀───────── └───────────┘            └─────┬─────┘
//!      ▲        cancel                    upload_ok    │  upload_err
//!      │                                               ▼
//!      │        play_end               ┌──────────┐  ┌───────┐
//!      └────────────────────────────── │ Speaking │  │ Error │──▶ Idle
//!                                      └──────────┘  └───────┘ cancel
//! ```
//!
//! The captured utterance plus a trailing window of conversation history is
//! handed to a turn service (in-process transcribe → reply → synthesize
//! pipeline, or a remote endpoint), and the synthesized reply plays back.
//! Microphone and speaker sit behind the [`voice::Recorder`] and
//! [`voice::Player`] traits so the controller is testable without hardware.

pub mod config;
pub mod error;
pub mod history;
pub mod persona;
pub mod pipeline;
pub mod turn;
pub mod voice;

pub use config::{Config, HistoryConfig, VoiceConfig};
pub use error::{Error, Result};
pub use history::{ConversationEntry, ConversationHistory, Role};
pub use persona::CoachPersona;
pub use pipeline::TurnPipeline;
pub use turn::{
    HttpTurnClient, TurnController, TurnEvent, TurnOutcome, TurnService, TurnState, transition,
};
