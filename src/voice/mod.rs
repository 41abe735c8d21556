//! Voice processing module
//!
//! Microphone capture with utterance endpointing, Whisper transcription,
//! online and offline speech synthesis, and local playback.

mod artifact;
mod capture;
mod command;
mod offline;
mod playback;
mod recognizer;
mod selector;
mod stt;
mod tts;
mod utterance;

pub use artifact::{AudioArtifact, AudioFormat};
pub use capture::{AudioCapture, SAMPLE_RATE, samples_to_wav};
pub use command::VoiceCommand;
pub use offline::{EspeakSynthesizer, OfflineSynthesizer};
pub use playback::{AudioPlayback, DecodedAudio, decode};
pub use recognizer::{MicrophoneRecognizer, SpeechRecognizer, record_utterance};
pub use selector::{SpeechBackendChoice, SynthesizedSpeech, plan_synthesis, synthesize_speech};
pub use stt::SpeechToText;
pub use tts::{GOOGLE_CHUNK_CHARS, GoogleTts, OnlineSynthesizer, OpenAiTts, chunk_text};
pub use utterance::{DetectorState, UtteranceDetector};
