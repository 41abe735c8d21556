//! Shared test utilities
//!
//! In-memory fakes for every backend seam, so pipeline tests run without
//! network access, audio hardware or external engines.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use lumen_reader::extract::Extractors;
use lumen_reader::nlp::SummaryBounds;
use lumen_reader::voice::{AudioArtifact, AudioFormat};
use lumen_reader::{
    Backends, DocumentExtractor, Error, Language, NetworkProbe, OfflineSynthesizer,
    OnlineSynthesizer, PageFetcher, Policy, Result, SpeechRecognizer, Summarizer, Translator,
};

/// Probe with a switchable answer
pub struct FixedProbe {
    online: AtomicBool,
    pub calls: AtomicUsize,
}

impl FixedProbe {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

#[async_trait]
impl NetworkProbe for FixedProbe {
    async fn is_reachable(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.online.load(Ordering::SeqCst)
    }
}

/// Extractor that returns canned text and counts invocations
pub struct RecordingExtractor {
    name: &'static str,
    reply: std::result::Result<String, String>,
    pub calls: AtomicUsize,
}

impl RecordingExtractor {
    pub fn ok(name: &'static str, text: &str) -> Self {
        Self {
            name,
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(name: &'static str, message: &str) -> Self {
        Self {
            name,
            reply: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentExtractor for RecordingExtractor {
    async fn extract(&self, _bytes: &[u8]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().map_err(Error::Parse)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// What the fake page fetcher answers with
#[derive(Clone)]
pub enum PageReply {
    Html(String),
    Status(u16),
}

pub struct FakeFetcher {
    reply: PageReply,
    pub calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn new(reply: PageReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            PageReply::Html(html) => Ok(html.clone()),
            PageReply::Status(status) => Err(Error::HttpStatus {
                status: *status,
                url: url.to_string(),
            }),
        }
    }
}

/// Recognizer that replays scripted transcripts, then times out
pub struct ScriptedRecognizer {
    replies: Mutex<VecDeque<Result<String>>>,
}

impl ScriptedRecognizer {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
        }
    }

    pub fn say(&self, transcript: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(transcript.to_string()));
    }

    pub fn fail(&self, err: Error) {
        self.replies.lock().unwrap().push_back(Err(err));
    }
}

#[async_trait]
impl SpeechRecognizer for ScriptedRecognizer {
    async fn listen(&self, timeout: Duration) -> Result<String> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(Error::SpeechTimeout(timeout.as_secs())))
    }
}

/// Network synthesizer that records the languages it was asked for
pub struct FakeOnlineTts {
    fail: AtomicBool,
    pub requests: Mutex<Vec<(String, Language)>>,
}

impl FakeOnlineTts {
    pub fn new() -> Self {
        Self {
            fail: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl OnlineSynthesizer for FakeOnlineTts {
    async fn synthesize(&self, text: &str, language: Language) -> Result<AudioArtifact> {
        self.requests
            .lock()
            .unwrap()
            .push((text.to_string(), language));
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Synthesis("service returned 503".to_string()));
        }
        AudioArtifact::from_bytes(b"ID3fake-mp3", AudioFormat::Mp3)
    }

    fn name(&self) -> &'static str {
        "fake-online"
    }
}

/// Offline synthesizer that, like the real engine, only speaks English
pub struct FakeOfflineTts {
    fail: AtomicBool,
    pub requests: Mutex<Vec<(String, Language)>>,
}

impl FakeOfflineTts {
    pub fn new() -> Self {
        Self {
            fail: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl OfflineSynthesizer for FakeOfflineTts {
    async fn synthesize(&self, text: &str, language: Language) -> Result<AudioArtifact> {
        if !language.is_english() {
            return Err(Error::UnsupportedOfflineLanguage(language));
        }
        self.requests
            .lock()
            .unwrap()
            .push((text.to_string(), language));
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Synthesis("engine exited with status 1".to_string()));
        }
        AudioArtifact::from_bytes(b"RIFFfake-wav", AudioFormat::Wav)
    }

    fn name(&self) -> &'static str {
        "fake-offline"
    }
}

/// Translator that tags text with the target code
pub struct FakeTranslator {
    pub inputs: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl FakeTranslator {
    pub fn new() -> Self {
        Self {
            inputs: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Translator for FakeTranslator {
    fn supports(&self, language: Language) -> bool {
        !language.is_english()
    }

    async fn translate(&self, text: &str, target: Language) -> Result<String> {
        self.inputs.lock().unwrap().push(text.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Model("model is loading".to_string()));
        }
        Ok(format!("[{}] {text}", target.code()))
    }
}

/// Summarizer that keeps the first sentence
pub struct FakeSummarizer {
    pub calls: AtomicUsize,
}

impl FakeSummarizer {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Summarizer for FakeSummarizer {
    async fn summarize(&self, text: &str, _bounds: SummaryBounds) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let first = text.split('.').next().unwrap_or(text).trim();
        Ok(format!("{first}."))
    }
}

/// Every fake behind one handle, for building backends and inspecting calls
pub struct Fakes {
    pub probe: Arc<FixedProbe>,
    pub pdf: Arc<RecordingExtractor>,
    pub docx: Arc<RecordingExtractor>,
    pub epub: Arc<RecordingExtractor>,
    pub text: Arc<RecordingExtractor>,
    pub image: Arc<RecordingExtractor>,
    pub fetcher: Arc<FakeFetcher>,
    pub recognizer: Arc<ScriptedRecognizer>,
    pub online_tts: Arc<FakeOnlineTts>,
    pub offline_tts: Arc<FakeOfflineTts>,
    pub translator: Arc<FakeTranslator>,
    pub summarizer: Arc<FakeSummarizer>,
    pub policy: Policy,
}

impl Fakes {
    pub fn new(online: bool) -> Self {
        Self {
            probe: Arc::new(FixedProbe::new(online)),
            pdf: Arc::new(RecordingExtractor::ok("pdf", "pdf text")),
            docx: Arc::new(RecordingExtractor::ok("docx", "docx text")),
            epub: Arc::new(RecordingExtractor::ok("epub", "epub text")),
            text: Arc::new(RecordingExtractor::ok("text", "plain text")),
            image: Arc::new(RecordingExtractor::ok("image", "ocr text")),
            fetcher: Arc::new(FakeFetcher::new(PageReply::Html(
                "<html><body><nav>menu</nav><p>Article body</p></body></html>".to_string(),
            ))),
            recognizer: Arc::new(ScriptedRecognizer::new()),
            online_tts: Arc::new(FakeOnlineTts::new()),
            offline_tts: Arc::new(FakeOfflineTts::new()),
            translator: Arc::new(FakeTranslator::new()),
            summarizer: Arc::new(FakeSummarizer::new()),
            policy: Policy::default(),
        }
    }

    pub fn backends(&self) -> Backends {
        Backends {
            probe: self.probe.clone(),
            extractors: Extractors {
                pdf: self.pdf.clone(),
                docx: self.docx.clone(),
                epub: self.epub.clone(),
                text: self.text.clone(),
                image: self.image.clone(),
            },
            fetcher: self.fetcher.clone(),
            recognizer: self.recognizer.clone(),
            online_tts: self.online_tts.clone(),
            offline_tts: self.offline_tts.clone(),
            translator: self.translator.clone(),
            summarizer: self.summarizer.clone(),
            policy: self.policy,
        }
    }

    /// Total extractor invocations across all formats
    pub fn extractor_calls(&self) -> usize {
        [&self.pdf, &self.docx, &self.epub, &self.text, &self.image]
            .iter()
            .map(|e| e.count())
            .sum()
    }
}

/// Text long enough to pass the summarization gate
pub fn long_text() -> String {
    let mut text = String::from("Rust makes systems programming approachable.");
    for _ in 0..12 {
        text.push_str(" Ownership rules keep memory safe without a collector.");
    }
    text
}
