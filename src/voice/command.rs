//! Spoken command parsing

/// An action requested by voice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceCommand {
    Summarize,
    /// `language` is the raw spoken name; `None` means ask for it
    Translate { language: Option<String> },
    ConvertToSpeech,
}

const SUMMARIZE_WORDS: [&str; 3] = ["summarize", "sumarize", "summarise"];

const SPEECH_PHRASES: [&str; 2] = ["convert to speech", "text to speech"];

impl VoiceCommand {
    /// Match a transcript against the command set
    ///
    /// Returns `None` for anything unrecognized.
    #[must_use]
    pub fn parse(transcript: &str) -> Option<Self> {
        let normalized: String = transcript
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
            .collect();
        let words: Vec<&str> = normalized.split_whitespace().collect();
        let phrase = words.join(" ");

        if words.iter().any(|w| SUMMARIZE_WORDS.contains(w)) {
            return Some(Self::Summarize);
        }

        if let Some(pos) = words.iter().position(|w| *w == "translate") {
            let mut rest = &words[pos + 1..];
            if let Some((first, tail)) = rest.split_first()
                && matches!(*first, "to" | "into" | "in")
            {
                rest = tail;
            }
            let language = (!rest.is_empty()).then(|| rest.join(" "));
            return Some(Self::Translate { language });
        }

        if SPEECH_PHRASES.iter().any(|p| phrase.contains(p)) {
            return Some(Self::ConvertToSpeech);
        }

        None
    }
}
