//! Voice processing: device audio seam and speech services
//!
//! [`Recorder`] and [`Player`] are the seams to the device audio subsystem.
//! The turn controller only sees these traits, so it can be exercised with
//! scripted doubles; the cpal-backed implementations live in [`capture`] and
//! [`playback`]. At most one recording handle and one playback handle are
//! live at a time; begin/finish and start/stop enforce that.

pub mod capture;
pub mod playback;
pub mod reply;
pub mod stt;
pub mod tts;

pub use capture::CpalRecorder;
pub use playback::CpalPlayer;
pub use reply::ReplyGenerator;
pub use stt::SpeechToText;
pub use tts::TextToSpeech;

use async_trait::async_trait;

use crate::{Error, Result};

/// Sample rate for microphone capture (16kHz for speech)
pub const SAMPLE_RATE: u32 = 16000;

/// Owns the single live recording handle
pub trait Recorder {
    /// Acquire the recording handle and start capturing
    ///
    /// # Errors
    ///
    /// Returns error if the device is unavailable or a recording is
    /// already live. Callers must not retry without releasing first.
    fn begin(&mut self) -> Result<()>;

    /// Stop capturing and finalize the recording as WAV bytes
    ///
    /// # Errors
    ///
    /// Returns error if no recording is live or nothing was captured;
    /// the turn must be failed before any network call is made.
    fn finish(&mut self) -> Result<Vec<u8>>;

    /// Release the recording handle, discarding captured audio (best-effort)
    fn abort(&mut self);
}

/// Owns the single live playback handle
#[async_trait]
pub trait Player {
    /// Begin playback of encoded reply audio, releasing any prior handle
    ///
    /// # Errors
    ///
    /// Returns error if decoding fails or no output device is available.
    async fn start(&mut self, audio: &[u8]) -> Result<()>;

    /// Wait for the current playback to finish (the completion watcher)
    ///
    /// Resolves immediately when no playback is live.
    ///
    /// # Errors
    ///
    /// Returns error if playback failed mid-stream.
    async fn wait_done(&mut self) -> Result<()>;

    /// Stop and release the current playback handle, swallowing errors
    async fn stop(&mut self);
}

/// Convert f32 samples to WAV bytes for STT APIs
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for &sample in samples {
            // f32 [-1.0, 1.0] to i16
            #[allow(clippy::cast_possible_truncation)]
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_to_wav_header() {
        let samples: Vec<f32> = (0..160).map(|i| f32::from(i16::try_from(i).unwrap()) / 160.0).collect();
        let wav = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert!(wav.len() > 44);
    }
}
