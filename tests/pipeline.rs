//! Session pipeline tests: load, summarize, translate, speak and voice

use std::sync::atomic::Ordering;

use lumen_reader::{AdvisoryKind, ContentSource, Error, Language, Session, SpeechBackendChoice};

mod common;
use common::{Fakes, long_text};

async fn loaded(fakes: &Fakes, text: &str) -> Session {
    let mut session = Session::new();
    session
        .load(&fakes.backends(), &ContentSource::RawText(text.to_string()), None)
        .await;
    session
}

#[tokio::test]
async fn test_actions_without_content_report_no_content() {
    let fakes = Fakes::new(true);
    let backends = fakes.backends();
    let mut session = Session::new();

    let summary = session.summarize(&backends).await;
    let translation = session.translate(&backends, "Hindi").await;
    let speech = session.speak(&backends).await;

    for report in [&summary, &translation, &speech] {
        assert_eq!(report.advisories[0].kind, AdvisoryKind::NoContent);
    }
    assert!(speech.audio.is_none());
    assert_eq!(fakes.summarizer.calls.load(Ordering::SeqCst), 0);
    assert_eq!(fakes.online_tts.count(), 0);
}

#[tokio::test]
async fn test_short_text_is_not_summarized() {
    let fakes = Fakes::new(true);
    let mut session = loaded(&fakes, "Only a few words here.").await;

    let report = session.summarize(&fakes.backends()).await;

    assert_eq!(report.text, "Only a few words here.");
    assert_eq!(report.advisories[0].kind, AdvisoryKind::TextTooShort);
    assert_eq!(fakes.summarizer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_summarize_then_translate_uses_summary() {
    let fakes = Fakes::new(true);
    let backends = fakes.backends();
    let mut session = loaded(&fakes, &long_text()).await;

    let summary = session.summarize(&backends).await;
    assert!(summary.advisories.is_empty());
    assert_eq!(summary.text, "Rust makes systems programming approachable.");

    let translation = session.translate(&backends, "french").await;
    assert!(translation.advisories.is_empty());
    assert!(translation.translated);
    assert_eq!(translation.language, Language::French);
    assert_eq!(
        translation.text,
        "[fr] Rust makes systems programming approachable."
    );
    assert_eq!(session.original(), long_text());
}

#[tokio::test]
async fn test_translate_twice_starts_from_english() {
    let fakes = Fakes::new(true);
    let backends = fakes.backends();
    let mut session = loaded(&fakes, "Good morning").await;

    session.translate(&backends, "Hindi").await;
    let report = session.translate(&backends, "German").await;

    assert_eq!(report.text, "[de] Good morning");
    let inputs = fakes.translator.inputs.lock().unwrap();
    assert_eq!(inputs.as_slice(), ["Good morning", "Good morning"]);
}

#[tokio::test]
async fn test_unknown_language_falls_back_to_english() {
    let fakes = Fakes::new(true);
    let mut session = loaded(&fakes, "Good morning").await;

    let report = session.translate(&fakes.backends(), "Klingon").await;

    assert_eq!(report.text, "Good morning");
    assert_eq!(report.language, Language::English);
    assert!(!report.translated);
    assert_eq!(report.advisories[0].kind, AdvisoryKind::UnsupportedLanguage);
    assert!(fakes.translator.inputs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_translation_failure_keeps_english() {
    let fakes = Fakes::new(true);
    fakes.translator.set_failing(true);
    let mut session = loaded(&fakes, "Good morning").await;

    let report = session.translate(&fakes.backends(), "Hindi").await;

    assert_eq!(report.text, "Good morning");
    assert_eq!(report.language, Language::English);
    assert!(!report.translated);
    assert_eq!(report.advisories[0].kind, AdvisoryKind::ModelInferenceError);
}

#[tokio::test]
async fn test_translation_input_is_truncated() {
    let mut fakes = Fakes::new(true);
    fakes.policy.translation_max_tokens = 3;
    let mut session = loaded(&fakes, "one two three four five").await;

    session.translate(&fakes.backends(), "German").await;

    let inputs = fakes.translator.inputs.lock().unwrap();
    assert_eq!(inputs[0], "one two three");
}

#[tokio::test]
async fn test_translated_text_is_spoken_in_its_language() {
    let fakes = Fakes::new(true);
    let backends = fakes.backends();
    let mut session = loaded(&fakes, "Good morning").await;
    session.translate(&backends, "Hindi").await;

    let report = session.speak(&backends).await;

    let speech = report.audio.unwrap();
    assert_eq!(
        speech.backend,
        SpeechBackendChoice::Network {
            language: Language::Hindi
        }
    );
    let requests = fakes.online_tts.requests.lock().unwrap();
    assert_eq!(requests[0], ("[hi] Good morning".to_string(), Language::Hindi));
}

#[tokio::test]
async fn test_summarize_resets_translation() {
    let fakes = Fakes::new(true);
    let backends = fakes.backends();
    let mut session = loaded(&fakes, &long_text()).await;
    session.translate(&backends, "French").await;
    assert!(session.translated());

    session.summarize(&backends).await;

    assert!(!session.translated());
    assert_eq!(session.language(), Language::English);
    assert_eq!(
        session.processed(),
        "Rust makes systems programming approachable."
    );
}

#[tokio::test]
async fn test_load_replaces_previous_content() {
    let fakes = Fakes::new(true);
    let backends = fakes.backends();
    let mut session = loaded(&fakes, "First text").await;
    session.translate(&backends, "German").await;

    session
        .load(&backends, &ContentSource::RawText("Second text".to_string()), None)
        .await;

    assert_eq!(session.processed(), "Second text");
    assert!(!session.translated());
}

#[tokio::test]
async fn test_voice_summarize_command() {
    let fakes = Fakes::new(true);
    let mut session = loaded(&fakes, &long_text()).await;
    fakes.recognizer.say("Summarize.");

    let report = session.handle_voice(&fakes.backends()).await;

    assert_eq!(report.transcript.as_deref(), Some("Summarize."));
    assert_eq!(report.text, "Rust makes systems programming approachable.");
}

#[tokio::test]
async fn test_voice_translate_with_language() {
    let fakes = Fakes::new(true);
    let mut session = loaded(&fakes, "Good morning").await;
    fakes.recognizer.say("translate to German");

    let report = session.handle_voice(&fakes.backends()).await;

    assert_eq!(report.text, "[de] Good morning");
    assert_eq!(report.language, Language::German);
}

#[tokio::test]
async fn test_voice_translate_asks_for_language() {
    let fakes = Fakes::new(true);
    let mut session = loaded(&fakes, "Good morning").await;
    fakes.recognizer.say("translate");
    fakes.recognizer.say("Hindi");

    let report = session.handle_voice(&fakes.backends()).await;

    assert_eq!(report.text, "[hi] Good morning");
    assert_eq!(report.transcript.as_deref(), Some("translate"));
}

#[tokio::test]
async fn test_voice_translate_language_timeout() {
    let fakes = Fakes::new(true);
    let mut session = loaded(&fakes, "Good morning").await;
    fakes.recognizer.say("translate");

    let report = session.handle_voice(&fakes.backends()).await;

    assert_eq!(report.text, "Good morning");
    assert_eq!(
        report.advisories[0].kind,
        AdvisoryKind::SpeechRecognitionTimeout
    );
}

#[tokio::test]
async fn test_voice_convert_to_speech() {
    let fakes = Fakes::new(true);
    let mut session = loaded(&fakes, "Good morning").await;
    fakes.recognizer.say("convert to speech please");

    let report = session.handle_voice(&fakes.backends()).await;

    assert!(report.audio.is_some());
    assert_eq!(fakes.online_tts.count(), 1);
}

#[tokio::test]
async fn test_voice_unrecognized_command() {
    let fakes = Fakes::new(true);
    let mut session = loaded(&fakes, "Good morning").await;
    fakes.recognizer.say("open the pod bay doors");

    let report = session.handle_voice(&fakes.backends()).await;

    assert_eq!(report.text, "Good morning");
    assert_eq!(report.advisories[0].kind, AdvisoryKind::CommandNotRecognized);
    assert!(report.advisories[0].message.contains("open the pod bay doors"));
    assert_eq!(fakes.summarizer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_voice_recognition_errors_become_advisories() {
    let fakes = Fakes::new(true);
    let mut session = loaded(&fakes, "Good morning").await;

    fakes.recognizer.fail(Error::SpeechUnrecognized);
    let report = session.handle_voice(&fakes.backends()).await;
    assert_eq!(report.advisories[0].kind, AdvisoryKind::SpeechUnrecognized);
    assert!(report.transcript.is_none());

    fakes
        .recognizer
        .fail(Error::SpeechServiceUnavailable("no API key".to_string()));
    let report = session.handle_voice(&fakes.backends()).await;
    assert_eq!(
        report.advisories[0].kind,
        AdvisoryKind::SpeechServiceUnavailable
    );
}
