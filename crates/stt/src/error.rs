use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TranscriptionError>;

/// Transcription failures with their HTTP mapping
#[derive(Debug, Error)]
pub enum TranscriptionError {
    /// The request carried no audio payload
    #[error("No audio file received")]
    MissingAudio,

    /// The multipart body could not be parsed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The upload exceeded the configured body limit
    #[error("Audio upload too large: {0}")]
    PayloadTooLarge(String),

    /// The speech model failed to produce a transcript
    #[error("Speech model failed: {0}")]
    Model(String),

    /// The speech model did not finish within the configured bound
    #[error("Speech model timed out after {}s", .0.as_secs())]
    ModelTimeout(Duration),

    /// Writing, reading, or removing the scoped audio file failed
    #[error("Audio file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Startup configuration could not be applied
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TranscriptionError {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingAudio | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ModelTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Model(_) | Self::Io(_) | Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable label, used as a metric attribute
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::MissingAudio => "missing_audio",
            Self::InvalidRequest(_) => "invalid_request",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::Model(_) => "model_error",
            Self::ModelTimeout(_) => "model_timeout",
            Self::Io(_) => "io_error",
            Self::Config(_) => "config_error",
        }
    }
}

/// Failure body: `{"success": false, "error": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl IntoResponse for TranscriptionError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error_type = self.error_type(), "transcription failed: {self}");
        } else {
            tracing::debug!(error_type = self.error_type(), "transcription rejected: {self}");
        }

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
