//! Microphone capture via cpal

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};

use super::{Recorder, SAMPLE_RATE, samples_to_wav};
use crate::{Error, Result};

/// Recording handle backed by the default input device
///
/// `begin` builds an input stream that accumulates mono f32 samples;
/// `finish` drops the stream and finalizes the capture as 16-bit WAV bytes.
/// An empty capture is a finalize failure, not an empty recording.
pub struct CpalRecorder {
    #[allow(dead_code)]
    device: Device,
    config: StreamConfig,
    buffer: Arc<Mutex<Vec<f32>>>,
    stream: Option<Stream>,
}

impl CpalRecorder {
    /// Create a recorder bound to the default input device
    ///
    /// # Errors
    ///
    /// Returns error if no input device or suitable mono config exists
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Audio("no input device available".to_string()))?;

        let supported_config = device
            .supported_input_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
            })
            .ok_or_else(|| Error::Audio("no suitable input config found".to_string()))?;

        let config = supported_config
            .with_sample_rate(SampleRate(SAMPLE_RATE))
            .config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = SAMPLE_RATE,
            channels = config.channels,
            "recorder initialized"
        );

        Ok(Self {
            device,
            config,
            buffer: Arc::new(Mutex::new(Vec::new())),
            stream: None,
        })
    }

    fn build_stream(&self) -> Result<Stream> {
        let buffer = Arc::clone(&self.buffer);
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Audio("no input device".to_string()))?;

        let stream = device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio capture error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;
        Ok(stream)
    }
}

impl Recorder for CpalRecorder {
    fn begin(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Err(Error::Audio("recording already in progress".to_string()));
        }

        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }

        self.stream = Some(self.build_stream()?);
        tracing::debug!("recording started");
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<u8>> {
        let Some(stream) = self.stream.take() else {
            return Err(Error::Recording("no active recording".to_string()));
        };
        drop(stream);

        let samples = self
            .buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default();

        if samples.is_empty() {
            return Err(Error::Recording("no audio captured".to_string()));
        }

        tracing::debug!(samples = samples.len(), "recording finalized");
        samples_to_wav(&samples, SAMPLE_RATE)
    }

    fn abort(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
        }
        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }
        tracing::debug!("recording aborted");
    }
}
