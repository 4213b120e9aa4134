//! Turn controller
//!
//! Sequences recorder, player, and turn-service side effects around the pure
//! transition function, and is the single source of truth for what the UI
//! may allow. All methods take `&mut self`, so transitions are
//! event-serialized; late completions fall through the transition table as
//! no-ops.

use tracing::{debug, info, warn};

use super::state::{TurnEvent, TurnState, transition};
use super::TurnService;
use crate::config::HistoryConfig;
use crate::history::{ConversationEntry, ConversationHistory};
use crate::voice::{Player, Recorder};

/// Drives one session's turn cycle
pub struct TurnController<R, P, S> {
    state: TurnState,
    history: ConversationHistory,
    request_window: usize,
    recorder: R,
    player: P,
    service: S,
    surfaced_error: Option<String>,
    reply_audio: Option<Vec<u8>>,
    playback_started: bool,
    replay_ready: bool,
}

impl<R, P, S> TurnController<R, P, S>
where
    R: Recorder,
    P: Player,
    S: TurnService,
{
    /// Create a controller in the `Idle` state with an empty history
    #[must_use]
    pub fn new(recorder: R, player: P, service: S, history: HistoryConfig) -> Self {
        Self {
            state: TurnState::Idle,
            history: ConversationHistory::new(history.cap),
            request_window: history.request_window,
            recorder,
            player,
            service,
            surfaced_error: None,
            reply_audio: None,
            playback_started: false,
            replay_ready: false,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> TurnState {
        self.state
    }

    /// Conversation history for this session
    #[must_use]
    pub const fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// The currently surfaced error message, if any
    #[must_use]
    pub fn surfaced_error(&self) -> Option<&str> {
        self.surfaced_error.as_deref()
    }

    /// Whether a reply has completed playback and can be replayed
    #[must_use]
    pub const fn can_replay(&self) -> bool {
        self.replay_ready
    }

    fn apply(&mut self, event: TurnEvent) {
        let next = transition(self.state, event);
        debug!(from = ?self.state, event = ?event, to = ?next, "turn transition");
        self.state = next;
    }

    fn surface(&mut self, message: String) {
        warn!(message = %message, "turn error surfaced");
        self.surfaced_error = Some(message);
    }

    /// User pressed the talk control; honored only in `Idle`
    ///
    /// Acquires the recording handle. On acquisition failure the machine is
    /// returned to `Idle` via a synthesized cancel so it is never left in
    /// `Listening` without a live recorder.
    pub fn press_down(&mut self) {
        if self.state != TurnState::Idle {
            debug!(state = ?self.state, "press_down ignored");
            return;
        }

        self.apply(TurnEvent::PressDown);

        if let Err(e) = self.recorder.begin() {
            self.apply(TurnEvent::Cancel);
            self.surface(e.to_string());
        }
    }

    /// User released the talk control; honored only in `Listening`
    ///
    /// Finalizes the recording and runs the upload. Without a valid
    /// recording the turn fails before any network call and the machine
    /// never enters `Uploading`.
    pub async fn press_up(&mut self) {
        if self.state != TurnState::Listening {
            debug!(state = ?self.state, "press_up ignored");
            return;
        }

        let wav = match self.recorder.finish() {
            Ok(wav) => wav,
            Err(e) => {
                // Abort pre-network: the recording handle is already gone,
                // so the turn lands in Error with cancel as the way out.
                self.state = TurnState::Error;
                self.surface(e.to_string());
                return;
            }
        };

        self.apply(TurnEvent::PressUp);

        let window = self.history.window(self.request_window).to_vec();
        match self.service.process_turn(wav, &window).await {
            Ok(outcome) => {
                info!(
                    transcript = %outcome.transcript,
                    reply = %outcome.reply_text,
                    "turn succeeded"
                );
                self.history
                    .append(ConversationEntry::user(outcome.transcript));
                self.history
                    .append(ConversationEntry::assistant(outcome.reply_text));

                // Playback failure is surfaced without forcing a transition;
                // the completion watcher still closes out the turn.
                self.apply(TurnEvent::UploadOk);
                match self.player.start(&outcome.audio).await {
                    Ok(()) => self.playback_started = true,
                    Err(e) => {
                        // The new reply never played, so it is not replayable
                        self.playback_started = false;
                        self.replay_ready = false;
                        self.surface(e.to_string());
                    }
                }
                self.reply_audio = Some(outcome.audio);
            }
            Err(e) => {
                self.apply(TurnEvent::UploadErr);
                self.surface(e.to_string());
            }
        }
    }

    /// Wait for reply playback to finish and close out the turn
    ///
    /// The completion watcher: resolves when playback ends and dispatches
    /// `PlayEnd`. Honored only in `Speaking`; calling it in any other state
    /// is a no-op, so a stray completion is harmless.
    pub async fn await_playback(&mut self) {
        if self.state != TurnState::Speaking {
            debug!(state = ?self.state, "await_playback ignored");
            return;
        }

        match self.player.wait_done().await {
            // Only a playback that actually started and completed unlocks replay
            Ok(()) => self.replay_ready = self.replay_ready || self.playback_started,
            Err(e) => self.surface(e.to_string()),
        }

        self.apply(TurnEvent::PlayEnd);
    }

    /// Explicit cancellation / error acknowledgement
    ///
    /// From `Listening` the recording handle is released (best-effort).
    /// The surfaced message is always cleared, so an error that did not
    /// force a transition (playback failure) is dismissable too. Lands in
    /// `Idle` when the table allows it.
    pub fn cancel(&mut self) {
        if self.state == TurnState::Listening {
            self.recorder.abort();
        }
        self.surfaced_error = None;
        self.apply(TurnEvent::Cancel);
    }

    /// Release any live handles at session teardown
    ///
    /// Best-effort: the recorder is aborted and the playback handle is
    /// stopped and unloaded, tolerating already-dead handles.
    pub async fn shutdown(&mut self) {
        self.recorder.abort();
        self.player.stop().await;
        debug!("controller shut down");
    }

    /// Replay the last reply audio
    ///
    /// Permitted only after a reply has completed playback at least once.
    /// Does not change state and does not touch history.
    pub async fn replay(&mut self) {
        if !self.replay_ready {
            debug!("replay ignored: no completed reply");
            return;
        }
        let Some(audio) = self.reply_audio.clone() else {
            return;
        };

        debug!(audio_bytes = audio.len(), "replaying last reply");
        if let Err(e) = self.player.start(&audio).await {
            self.surface(e.to_string());
            return;
        }
        if let Err(e) = self.player.wait_done().await {
            self.surface(e.to_string());
        }
    }
}
