//! TOML configuration file loading
//!
//! Supports `~/.config/omni/lumen/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::Language;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct LumenConfigFile {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Upload limits
    #[serde(default)]
    pub limits: LimitsFileConfig,

    /// Network probe and fetch configuration
    #[serde(default)]
    pub network: NetworkFileConfig,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Summarization and translation models
    #[serde(default)]
    pub nlp: NlpFileConfig,

    /// OCR engine configuration
    #[serde(default)]
    pub ocr: OcrFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// API server port
    pub port: Option<u16>,

    /// Bind address (e.g. "127.0.0.1")
    pub host: Option<String>,
}

/// Upload limits
#[derive(Debug, Default, Deserialize)]
pub struct LimitsFileConfig {
    /// Maximum upload size in megabytes
    pub max_upload_mb: Option<u64>,
}

/// Network configuration
#[derive(Debug, Default, Deserialize)]
pub struct NetworkFileConfig {
    /// Address used for the reachability probe (e.g. "8.8.8.8:53")
    pub probe_addr: Option<String>,

    /// Probe timeout in seconds
    pub probe_timeout_secs: Option<u64>,

    /// Page fetch timeout in seconds
    pub fetch_timeout_secs: Option<u64>,

    /// User-Agent sent when fetching pages
    pub user_agent: Option<String>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Seconds to wait for speech to start
    pub listen_timeout_secs: Option<u64>,

    /// Maximum utterance length in seconds
    pub phrase_limit_secs: Option<u64>,

    /// STT model (e.g. "whisper-1")
    pub stt_model: Option<String>,

    /// Online TTS provider ("google" or "openai")
    pub tts_provider: Option<String>,

    /// TTS model for the OpenAI provider (e.g. "tts-1")
    pub tts_model: Option<String>,

    /// TTS voice for the OpenAI provider (e.g. "alloy")
    pub tts_voice: Option<String>,

    /// Offline engine binary (e.g. "espeak-ng")
    pub offline_engine: Option<String>,

    /// Offline speaking rate in words per minute
    pub offline_rate_wpm: Option<u32>,

    /// Speak non-English text with the offline English voice when offline
    pub degrade_to_english: Option<bool>,
}

/// Summarization and translation configuration
#[derive(Debug, Default, Deserialize)]
pub struct NlpFileConfig {
    /// Base URL of the inference endpoint
    pub inference_url: Option<String>,

    /// Summarization model identifier
    pub summarizer_model: Option<String>,

    /// Translation model per target language code
    pub translation_models: Option<HashMap<Language, String>>,

    /// Input token budget for translation
    pub translation_max_tokens: Option<usize>,

    /// Texts shorter than this many words are not summarized
    pub summary_min_words: Option<usize>,

    /// Minimum summary length
    pub summary_min_length: Option<u32>,

    /// Maximum summary length
    pub summary_max_length: Option<u32>,

    /// Inference request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// OCR configuration
#[derive(Debug, Default, Deserialize)]
pub struct OcrFileConfig {
    /// Path or name of the tesseract binary
    pub tesseract_cmd: Option<String>,

    /// Tesseract language pack (e.g. "eng")
    pub language: Option<String>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub huggingface: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `LumenConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> LumenConfigFile {
    let Some(path) = config_file_path() else {
        return LumenConfigFile::default();
    };

    if !path.exists() {
        return LumenConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match parse_config(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                LumenConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            LumenConfigFile::default()
        }
    }
}

/// Parse config file contents
///
/// # Errors
///
/// Returns error if the TOML is malformed
pub fn parse_config(content: &str) -> crate::Result<LumenConfigFile> {
    Ok(toml::from_str(content)?)
}

/// Return the config file path: `~/.config/omni/lumen/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| {
        d.config_dir()
            .join("omni")
            .join("lumen")
            .join("config.toml")
    })
}
