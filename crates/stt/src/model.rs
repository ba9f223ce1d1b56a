pub(crate) mod openai;
pub(crate) mod whisper_cli;

use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use scribe_config::{ModelBackendConfig, ModelConfig};

use crate::types::{ModelOptions, ModelResult};

/// A loaded speech recognition model
///
/// Implementations are created once at startup and shared by every
/// request; `transcribe` must not mutate shared state.
#[async_trait]
pub trait SpeechModel: Send + Sync {
    /// Recognize the audio stored at `audio`
    async fn transcribe(&self, audio: &Path, options: &ModelOptions) -> crate::error::Result<ModelResult>;

    /// Backend name used in logs
    fn name(&self) -> &str;
}

/// Construct the configured speech model backend
///
/// Failure here is fatal to the process.
pub fn load(config: &ModelConfig) -> crate::error::Result<Arc<dyn SpeechModel>> {
    let model: Arc<dyn SpeechModel> = match &config.backend {
        ModelBackendConfig::Openai(openai) => Arc::new(openai::OpenAiSpeechModel::new(openai)),
        ModelBackendConfig::WhisperCli(cli) => Arc::new(whisper_cli::WhisperCliModel::new(cli)?),
    };

    tracing::info!(backend = model.name(), "speech model ready");

    Ok(model)
}
