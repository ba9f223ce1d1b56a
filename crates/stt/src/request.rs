use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Multipart, multipart::MultipartError},
    http::{self, StatusCode},
};

use crate::{
    error::TranscriptionError,
    types::{LanguageCode, OutputLanguage, Task, TranscriptionRequest},
};

/// Extractor for the `/transcribe` multipart upload
///
/// Fields: `audio` (required file), `inputLanguage`, `outputLanguage`,
/// `task`, `timestamps`. Unknown fields are ignored.
pub struct ExtractTranscription(pub TranscriptionRequest);

/// Form fields as received, before normalization
#[derive(Debug, Default)]
struct RawForm {
    audio: Option<Bytes>,
    filename: Option<String>,
    input_language: Option<String>,
    output_language: Option<String>,
    task: Option<String>,
    timestamps: Option<String>,
}

impl RawForm {
    fn into_request(self) -> Result<TranscriptionRequest, TranscriptionError> {
        let audio = self
            .audio
            .filter(|audio| !audio.is_empty())
            .ok_or(TranscriptionError::MissingAudio)?;

        let input_language = self
            .input_language
            .as_deref()
            .and_then(LanguageCode::parse)
            .filter(|code| code.as_str() != "auto");

        Ok(TranscriptionRequest {
            audio,
            filename: self.filename,
            input_language,
            output_language: OutputLanguage::parse(self.output_language.as_deref()),
            task: self.task.as_deref().map(Task::coerce),
            timestamps: self.timestamps.is_some_and(|value| value.trim() == "true"),
        })
    }
}

fn multipart_error(error: &MultipartError) -> TranscriptionError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        TranscriptionError::PayloadTooLarge(error.body_text())
    } else {
        TranscriptionError::InvalidRequest(error.body_text())
    }
}

impl<S> FromRequest<S> for ExtractTranscription
where
    S: Send + Sync,
{
    type Rejection = TranscriptionError;

    async fn from_request(request: http::Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = request
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        // Anything but a multipart upload cannot carry the audio file
        if !is_multipart {
            return Err(TranscriptionError::MissingAudio);
        }

        let mut multipart = Multipart::from_request(request, state)
            .await
            .map_err(|e| TranscriptionError::InvalidRequest(e.body_text()))?;

        let mut form = RawForm::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| multipart_error(&e))? {
            let name = field.name().unwrap_or_default().to_string();

            match name.as_str() {
                "audio" => {
                    form.filename = field.file_name().map(str::to_string);
                    form.audio = Some(field.bytes().await.map_err(|e| multipart_error(&e))?);
                }
                "inputLanguage" => form.input_language = Some(field.text().await.map_err(|e| multipart_error(&e))?),
                "outputLanguage" => form.output_language = Some(field.text().await.map_err(|e| multipart_error(&e))?),
                "task" => form.task = Some(field.text().await.map_err(|e| multipart_error(&e))?),
                "timestamps" => form.timestamps = Some(field.text().await.map_err(|e| multipart_error(&e))?),
                other => tracing::debug!(field = other, "ignoring unknown form field"),
            }
        }

        form.into_request().map(Self)
    }
}
