//! Turn-taking state machine
//!
//! A deterministic finite-state controller core governing one interaction
//! cycle: capture → upload → reply playback → idle. The transition function
//! is pure and total; events not listed for a state leave it unchanged, so a
//! stray completion (e.g. a late `PlayEnd` after a cancel) is a safe no-op.

/// State of the turn cycle, exactly one active at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Waiting for the user to start speaking
    Idle,
    /// Microphone capture in progress
    Listening,
    /// Captured audio in flight to the turn service
    Uploading,
    /// Reply audio playing back
    Speaking,
    /// Turn failed; waiting for the user to acknowledge
    Error,
}

/// Input to the state machine, consumed immediately by [`transition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnEvent {
    /// User pressed the talk control
    PressDown,
    /// User released the talk control
    PressUp,
    /// Upload request dispatched
    UploadStart,
    /// Turn service responded successfully
    UploadOk,
    /// Turn service failed or returned a malformed response
    UploadErr,
    /// Reply playback finished
    PlayEnd,
    /// Explicit user cancellation / acknowledgement
    Cancel,
}

/// Pure transition function over the full (state, event) space
///
/// Unlisted pairs are identity transitions. The machine has no terminal
/// state; it cycles for the life of the session.
#[must_use]
#[allow(clippy::match_same_arms)] // one row per table entry
pub const fn transition(state: TurnState, event: TurnEvent) -> TurnState {
    match (state, event) {
        (TurnState::Idle, TurnEvent::PressDown) => TurnState::Listening,
        (TurnState::Listening, TurnEvent::PressUp) => TurnState::Uploading,
        (TurnState::Listening | TurnState::Error, TurnEvent::Cancel) => TurnState::Idle,
        (TurnState::Uploading, TurnEvent::UploadOk) => TurnState::Speaking,
        (TurnState::Uploading, TurnEvent::UploadErr) => TurnState::Error,
        (TurnState::Speaking, TurnEvent::PlayEnd) => TurnState::Idle,
        (s, _) => s,
    }
}
