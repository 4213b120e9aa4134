//! Shared test doubles: scripted recorder, player, and turn service
//!
//! Each double exposes `Arc`-shared counters so tests can keep a handle after
//! moving the double into the controller.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use parla::history::ConversationEntry;
use parla::turn::{TurnOutcome, TurnService};
use parla::voice::{Player, Recorder};
use parla::{Error, Result};

/// Recorder double producing a fixed WAV payload
pub struct ScriptedRecorder {
    fail_begin: bool,
    fail_finish: bool,
    live: bool,
    pub begins: Arc<Mutex<usize>>,
    pub aborts: Arc<Mutex<usize>>,
}

impl ScriptedRecorder {
    pub fn working() -> Self {
        Self {
            fail_begin: false,
            fail_finish: false,
            live: false,
            begins: Arc::new(Mutex::new(0)),
            aborts: Arc::new(Mutex::new(0)),
        }
    }

    /// Recorder whose handle acquisition always fails
    pub fn failing_begin() -> Self {
        Self {
            fail_begin: true,
            ..Self::working()
        }
    }

    /// Recorder that acquires fine but captures nothing
    pub fn failing_finish() -> Self {
        Self {
            fail_finish: true,
            ..Self::working()
        }
    }
}

impl Recorder for ScriptedRecorder {
    fn begin(&mut self) -> Result<()> {
        if self.fail_begin {
            return Err(Error::Audio("microphone permission denied".to_string()));
        }
        assert!(!self.live, "second recording handle acquired");
        self.live = true;
        *self.begins.lock().unwrap() += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<u8>> {
        if !self.live {
            return Err(Error::Recording("no active recording".to_string()));
        }
        self.live = false;
        if self.fail_finish {
            return Err(Error::Recording("no audio captured".to_string()));
        }
        Ok(b"RIFFfakewav".to_vec())
    }

    fn abort(&mut self) {
        self.live = false;
        *self.aborts.lock().unwrap() += 1;
    }
}

/// Player double recording every payload it is asked to play
pub struct ScriptedPlayer {
    /// Fail `start` once this many playbacks have succeeded
    fail_from: Option<usize>,
    playing: bool,
    pub starts: Arc<Mutex<Vec<Vec<u8>>>>,
    pub stops: Arc<Mutex<usize>>,
}

impl ScriptedPlayer {
    pub fn working() -> Self {
        Self {
            fail_from: None,
            playing: false,
            starts: Arc::new(Mutex::new(Vec::new())),
            stops: Arc::new(Mutex::new(0)),
        }
    }

    /// Player whose handle acquisition always fails
    pub fn failing_start() -> Self {
        Self {
            fail_from: Some(0),
            ..Self::working()
        }
    }

    /// Player that works for `n` playbacks and then fails to start
    pub fn failing_start_after(n: usize) -> Self {
        Self {
            fail_from: Some(n),
            ..Self::working()
        }
    }
}

#[async_trait]
impl Player for ScriptedPlayer {
    async fn start(&mut self, audio: &[u8]) -> Result<()> {
        // Prior handle is released first, tolerating the no-handle case
        self.playing = false;
        let succeeded = self.starts.lock().unwrap().len();
        if self.fail_from.is_some_and(|n| succeeded >= n) {
            return Err(Error::Audio("no output device".to_string()));
        }
        self.starts.lock().unwrap().push(audio.to_vec());
        self.playing = true;
        Ok(())
    }

    async fn wait_done(&mut self) -> Result<()> {
        self.playing = false;
        Ok(())
    }

    async fn stop(&mut self) {
        self.playing = false;
        *self.stops.lock().unwrap() += 1;
    }
}

/// One scripted response from the turn service
#[derive(Clone, Copy)]
pub enum ServiceReply {
    Ok {
        transcript: &'static str,
        reply_text: &'static str,
    },
    Fail(&'static str),
}

/// Turn service double replaying a script and recording every call
pub struct ScriptedService {
    script: Mutex<VecDeque<ServiceReply>>,
    pub calls: Arc<Mutex<Vec<Vec<ConversationEntry>>>>,
}

impl ScriptedService {
    pub fn new(script: Vec<ServiceReply>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn succeeding(transcript: &'static str, reply_text: &'static str) -> Self {
        Self::new(vec![ServiceReply::Ok {
            transcript,
            reply_text,
        }])
    }

    pub fn failing(message: &'static str) -> Self {
        Self::new(vec![ServiceReply::Fail(message)])
    }
}

/// The MP3-stand-in payload every successful scripted turn returns
pub const REPLY_AUDIO: &[u8] = b"fake-mp3-reply";

#[async_trait]
impl TurnService for ScriptedService {
    async fn process_turn(
        &self,
        _audio: Vec<u8>,
        history: &[ConversationEntry],
    ) -> Result<TurnOutcome> {
        self.calls.lock().unwrap().push(history.to_vec());

        match self.script.lock().unwrap().pop_front() {
            Some(ServiceReply::Ok {
                transcript,
                reply_text,
            }) => Ok(TurnOutcome {
                audio: REPLY_AUDIO.to_vec(),
                transcript: transcript.to_string(),
                reply_text: reply_text.to_string(),
            }),
            Some(ServiceReply::Fail(message)) => Err(Error::Turn(message.to_string())),
            None => Err(Error::Turn("unscripted turn call".to_string())),
        }
    }
}
