//! Microphone capture
//!
//! The default input device is opened in its own preferred layout. The
//! stream callback folds each frame to mono and [`AudioCapture::take_buffer`]
//! converts the result to [`SAMPLE_RATE`], so the utterance detector and
//! Whisper always see 16 kHz mono regardless of hardware.

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use rubato::{FftFixedIn, Resampler};

use crate::{Error, Result};

/// Rate handed to the utterance detector and speech-to-text
pub const SAMPLE_RATE: u32 = 16000;

/// Device-rate frames requested per resampler pass
const RESAMPLE_CHUNK: usize = 1024;

/// Records mono speech from the default input device
pub struct AudioCapture {
    device: Device,
    config: StreamConfig,
    format: SampleFormat,
    device_samples: Arc<Mutex<Vec<f32>>>,
    converter: RateConverter,
    stream: Option<Stream>,
}

impl AudioCapture {
    /// Open the default input device with its default configuration
    ///
    /// # Errors
    ///
    /// Returns error if there is no input device or it reports no usable config
    pub fn new() -> Result<Self> {
        let device = cpal::default_host()
            .default_input_device()
            .ok_or_else(|| Error::Audio("no input device available".to_string()))?;

        let supported = device
            .default_input_config()
            .map_err(|e| Error::Audio(format!("input device has no default config: {e}")))?;
        let format = supported.sample_format();
        let config = supported.config();
        let converter = RateConverter::new(config.sample_rate.0, SAMPLE_RATE)?;

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            device_rate = config.sample_rate.0,
            channels = config.channels,
            format = ?format,
            "microphone opened"
        );

        Ok(Self {
            device,
            config,
            format,
            device_samples: Arc::new(Mutex::new(Vec::new())),
            converter,
            stream: None,
        })
    }

    /// Start the input stream; a no-op while already running
    ///
    /// # Errors
    ///
    /// Returns error for unsupported sample formats or if the stream fails
    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let stream = match self.format {
            SampleFormat::F32 => self.build_stream::<f32>(),
            SampleFormat::I16 => self.build_stream::<i16>(),
            SampleFormat::U16 => self.build_stream::<u16>(),
            SampleFormat::I32 => self.build_stream::<i32>(),
            other => Err(Error::Audio(format!("unsupported input sample format {other:?}"))),
        }?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;
        self.stream = Some(stream);
        tracing::debug!("microphone capture started");
        Ok(())
    }

    fn build_stream<T>(&self) -> Result<Stream>
    where
        T: Sample + SizedSample + Send + 'static,
        f32: cpal::FromSample<T>,
    {
        let sink = Arc::clone(&self.device_samples);
        let channels = usize::from(self.config.channels.max(1));

        self.device
            .build_input_stream(
                &self.config,
                move |data: &[T], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = sink.lock() {
                        buf.extend(fold_to_mono(data, channels));
                    }
                },
                |err| tracing::error!(error = %err, "microphone stream error"),
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))
    }

    /// Stop the input stream
    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!("microphone capture stopped");
        }
    }

    /// Drain everything recorded since the last call, as mono at [`SAMPLE_RATE`]
    ///
    /// Up to one resampler chunk of device audio may be held back until
    /// the next call.
    pub fn take_buffer(&mut self) -> Vec<f32> {
        let pending = self
            .device_samples
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default();

        self.converter.push(&pending).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "dropping captured audio");
            Vec::new()
        })
    }

    /// Rate of the samples returned by [`Self::take_buffer`]
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }
}

/// Average each interleaved frame into one sample
#[allow(clippy::cast_precision_loss)]
fn fold_to_mono<T>(data: &[T], channels: usize) -> impl Iterator<Item = f32> + '_
where
    T: Sample,
    f32: cpal::FromSample<T>,
{
    data.chunks(channels.max(1)).map(|frame| {
        frame.iter().map(|&s| s.to_sample::<f32>()).sum::<f32>() / frame.len() as f32
    })
}

/// Streaming mono rate conversion
///
/// Input arrives in arbitrary slices; it is buffered and fed to rubato in
/// fixed chunks so no samples are lost between calls.
struct RateConverter {
    resampler: Option<FftFixedIn<f32>>,
    pending: Vec<f32>,
}

impl RateConverter {
    fn new(from_rate: u32, to_rate: u32) -> Result<Self> {
        let resampler = if from_rate == to_rate {
            None
        } else {
            let resampler = FftFixedIn::<f32>::new(
                from_rate as usize,
                to_rate as usize,
                RESAMPLE_CHUNK,
                2,
                1,
            )
            .map_err(|e| Error::Audio(format!("resampler init failed: {e}")))?;
            Some(resampler)
        };

        Ok(Self {
            resampler,
            pending: Vec::new(),
        })
    }

    fn push(&mut self, samples: &[f32]) -> Result<Vec<f32>> {
        let Some(resampler) = self.resampler.as_mut() else {
            return Ok(samples.to_vec());
        };

        self.pending.extend_from_slice(samples);
        let mut output = Vec::new();

        loop {
            let needed = resampler.input_frames_next();
            if self.pending.len() < needed {
                break;
            }
            let block = resampler
                .process(&[&self.pending[..needed]], None)
                .map_err(|e| Error::Audio(format!("resample failed: {e}")))?;
            output.extend_from_slice(&block[0]);
            self.pending.drain(..needed);
        }

        Ok(output)
    }
}

/// Encode mono samples as 16-bit PCM WAV, the upload format for Whisper
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
    let mut writer =
        hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

    for &sample in samples {
        writer
            .write_sample(sample.to_sample::<i16>())
            .map_err(|e| Error::Audio(e.to_string()))?;
    }
    writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;

    Ok(cursor.into_inner())
}
