//! Response bodies shared by the action endpoints

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;

use crate::advisory::{Advisory, AdvisoryKind};
use crate::session::ActionReport;
use crate::voice::SpeechBackendChoice;
use crate::Language;

/// Body returned by every action endpoint
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub text: String,
    pub language: Language,
    pub translated: bool,
    pub advisories: Vec<Advisory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

/// Synthesized audio, inlined for the page's player
#[derive(Debug, Serialize)]
pub struct AudioPayload {
    pub mime: &'static str,
    pub language: Language,
    pub backend: SpeechBackendChoice,
    pub data_base64: String,
}

impl ActionResponse {
    /// Convert a report, reading any audio artifact into the body
    ///
    /// The artifact file is deleted once read.
    pub async fn from_report(report: ActionReport) -> Self {
        let mut advisories = report.advisories;

        let audio = match report.audio {
            Some(speech) => match speech.artifact.read_bytes().await {
                Ok(bytes) => Some(AudioPayload {
                    mime: speech.artifact.mime(),
                    language: speech.language,
                    backend: speech.backend,
                    data_base64: BASE64.encode(bytes),
                }),
                Err(e) => {
                    tracing::error!(error = %e, "failed to read synthesized audio");
                    advisories.push(Advisory::error(
                        AdvisoryKind::SynthesisFailed,
                        format!("Audio was generated but could not be read: {e}"),
                    ));
                    None
                }
            },
            None => None,
        };

        Self {
            text: report.text,
            language: report.language,
            translated: report.translated,
            advisories,
            audio,
            transcript: report.transcript,
        }
    }
}

/// Request-level API errors
///
/// Pipeline failures never surface here; they travel as advisories.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    PayloadTooLarge(String),
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(err.body_text())
        } else {
            Self::BadRequest(err.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: ErrorBody,
        }

        #[derive(Serialize)]
        struct ErrorBody {
            code: &'static str,
            message: String,
        }

        let (status, code, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, "file_too_large", msg),
        };

        (status, Json(ErrorResponse { error: ErrorBody { code, message } })).into_response()
    }
}
