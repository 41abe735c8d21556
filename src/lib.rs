//! Lumen Reader - content accessibility service
//!
//! Acquires text from documents, web pages or pasted input, then summarizes,
//! translates and reads it aloud. The core is a dispatcher that picks an
//! extraction pathway and a speech pathway per request, based on the input
//! and the current network state, and degrades with an advisory when a
//! pathway fails.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    Interfaces                        │
//! │        HTTP page  │  voice commands  │  CLI          │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                    Session                           │
//! │   acquire  │  summarize gate  │  translate gate     │
//! │            │  speech selector                        │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                   Backends                           │
//! │  extractors │ fetcher │ probe │ STT │ TTS │ models  │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod acquire;
pub mod advisory;
pub mod api;
pub mod backends;
pub mod config;
pub mod error;
pub mod extract;
pub mod language;
pub mod network;
pub mod nlp;
pub mod session;
pub mod voice;
pub mod web;

pub use acquire::{ContentSource, ExtractionResult, resolve};
pub use advisory::{Advisory, AdvisoryKind, Outcome, Severity};
pub use backends::{Backends, Policy};
pub use config::Config;
pub use error::{Error, Result};
pub use extract::{DocumentExtractor, DocumentFormat, Extractors};
pub use language::{Language, LanguageResolution, resolve_language};
pub use network::{NetworkProbe, TcpProbe};
pub use nlp::{SummaryBounds, Summarizer, Translator, maybe_summarize, maybe_translate};
pub use session::{ActionReport, Session};
pub use voice::{
    AudioArtifact, AudioFormat, OfflineSynthesizer, OnlineSynthesizer, SpeechBackendChoice,
    SpeechRecognizer, SynthesizedSpeech, VoiceCommand, plan_synthesis, synthesize_speech,
};
pub use web::{PageFetcher, strip_html_to_text};
