use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use scribe_config::OpenAiModelConfig;
use secrecy::{ExposeSecret, SecretString};

use crate::{
    error::TranscriptionError,
    http_client::http_client,
    types::{LanguageCode, ModelOptions, ModelResult, Segment, Task},
};

use super::SpeechModel;

/// Whisper served behind the OpenAI audio API
///
/// Works against OpenAI itself and self-hosted servers exposing the same
/// `/audio/transcriptions` and `/audio/translations` routes.
pub(crate) struct OpenAiSpeechModel {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
    model: String,
}

impl OpenAiSpeechModel {
    pub fn new(config: &OpenAiModelConfig) -> Self {
        Self {
            client: http_client(),
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }
}

#[derive(serde::Deserialize)]
struct VerboseTranscription {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    segments: Option<Vec<WireSegment>>,
}

#[derive(serde::Deserialize)]
struct WireSegment {
    start: f64,
    end: f64,
    text: String,
}

impl From<VerboseTranscription> for ModelResult {
    fn from(wire: VerboseTranscription) -> Self {
        Self {
            text: wire.text,
            detected_language: wire.language.as_deref().and_then(LanguageCode::from_model_label),
            segments: wire.segments.map(|segments| {
                segments
                    .into_iter()
                    .map(|s| Segment {
                        start: s.start,
                        end: s.end,
                        text: s.text,
                    })
                    .collect()
            }),
        }
    }
}

#[async_trait]
impl SpeechModel for OpenAiSpeechModel {
    async fn transcribe(&self, audio: &Path, options: &ModelOptions) -> crate::error::Result<ModelResult> {
        let route = match options.task {
            Task::Transcribe => "transcriptions",
            Task::Translate => "translations",
        };
        let url = format!("{}/audio/{route}", self.base_url);

        let bytes = tokio::fs::read(audio).await?;
        let filename = audio
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        tracing::debug!(
            "Whisper {} request: {} bytes, model={}, language={}",
            options.task,
            bytes.len(),
            self.model,
            options.language.as_ref().map_or("auto", LanguageCode::as_str),
        );

        let mut form = reqwest::multipart::Form::new()
            .part("file", reqwest::multipart::Part::bytes(bytes).file_name(filename))
            .text("model", self.model.clone())
            .text("response_format", "verbose_json");

        // The translations route always targets English and takes no hint
        if options.task == Task::Transcribe
            && let Some(language) = &options.language
        {
            form = form.text("language", language.to_string());
        }

        let mut request = self.client.post(&url).multipart(form);

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("Whisper request failed: {e}");
            TranscriptionError::Model(format!("failed to reach speech model: {e}"))
        })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

            tracing::error!("Whisper API error ({status}): {error_text}");

            return Err(TranscriptionError::Model(format!(
                "speech model returned {status}: {error_text}"
            )));
        }

        let result: VerboseTranscription = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Whisper response: {e}");
            TranscriptionError::Model(format!("unreadable speech model response: {e}"))
        })?;

        Ok(result.into())
    }

    fn name(&self) -> &str {
        "openai"
    }
}
