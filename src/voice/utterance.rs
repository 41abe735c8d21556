//! Utterance endpointing
//!
//! Splits a microphone stream into a single spoken phrase using RMS energy.
//! The speech threshold is calibrated against ambient noise before listening.

/// Threshold used until calibration runs
const DEFAULT_ENERGY_THRESHOLD: f32 = 0.03;

/// Calibrated thresholds never drop below this
const MIN_ENERGY_THRESHOLD: f32 = 0.01;

/// Speech must be this much louder than the ambient level
const AMBIENT_MULTIPLIER: f32 = 1.5;

/// Minimum duration of speech to count as an utterance (in samples at 16kHz)
const MIN_SPEECH_SAMPLES: usize = 4800; // 0.3 seconds

/// Silence duration that ends an utterance (in samples)
const SILENCE_SAMPLES: usize = 8000; // 0.5 seconds

/// State of the utterance detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// Waiting for speech to start
    Waiting,
    /// Speech started, accumulating
    Speaking,
    /// Phrase finished by trailing silence or the phrase limit
    Complete,
}

/// Detects the start and end of one spoken phrase
pub struct UtteranceDetector {
    threshold: f32,
    phrase_limit_samples: usize,
    state: DetectorState,
    speech_buffer: Vec<f32>,
    silence_counter: usize,
}

impl UtteranceDetector {
    /// Create a detector that caps phrases at `phrase_limit_samples`
    #[must_use]
    pub const fn new(phrase_limit_samples: usize) -> Self {
        Self {
            threshold: DEFAULT_ENERGY_THRESHOLD,
            phrase_limit_samples,
            state: DetectorState::Waiting,
            speech_buffer: Vec::new(),
            silence_counter: 0,
        }
    }

    /// Set the speech threshold from a sample of ambient noise
    pub fn calibrate(&mut self, ambient: &[f32]) {
        let ambient_energy = calculate_energy(ambient);
        self.threshold = (ambient_energy * AMBIENT_MULTIPLIER).max(MIN_ENERGY_THRESHOLD);
        tracing::debug!(ambient_energy, threshold = self.threshold, "calibrated to ambient noise");
    }

    /// Feed the next block of samples and return the resulting state
    pub fn process(&mut self, samples: &[f32]) -> DetectorState {
        let energy = calculate_energy(samples);
        let is_speech = energy > self.threshold;

        match self.state {
            DetectorState::Waiting => {
                if is_speech {
                    self.state = DetectorState::Speaking;
                    self.speech_buffer.clear();
                    self.speech_buffer.extend_from_slice(samples);
                    self.silence_counter = 0;
                    tracing::trace!(energy, "speech started");
                }
            }
            DetectorState::Speaking => {
                self.speech_buffer.extend_from_slice(samples);

                if is_speech {
                    self.silence_counter = 0;
                } else {
                    self.silence_counter += samples.len();
                }

                if self.speech_buffer.len() >= self.phrase_limit_samples {
                    tracing::debug!(samples = self.speech_buffer.len(), "phrase limit reached");
                    self.state = DetectorState::Complete;
                } else if self.silence_counter > SILENCE_SAMPLES {
                    if self.speech_buffer.len() > MIN_SPEECH_SAMPLES + self.silence_counter {
                        tracing::debug!(samples = self.speech_buffer.len(), "utterance complete");
                        self.state = DetectorState::Complete;
                    } else {
                        // A click or cough, not speech
                        tracing::trace!("blip discarded");
                        self.reset();
                    }
                }
            }
            DetectorState::Complete => {}
        }

        self.state
    }

    /// Take the captured phrase, leaving the detector waiting again
    pub fn take_utterance(&mut self) -> Vec<f32> {
        let utterance = std::mem::take(&mut self.speech_buffer);
        self.reset();
        utterance
    }

    /// Reset detector to the waiting state
    pub fn reset(&mut self) {
        self.state = DetectorState::Waiting;
        self.speech_buffer.clear();
        self.silence_counter = 0;
    }

    #[must_use]
    pub const fn state(&self) -> DetectorState {
        self.state
    }

    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }
}

/// Calculate RMS energy of audio samples
#[allow(clippy::cast_precision_loss)]
fn calculate_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}
