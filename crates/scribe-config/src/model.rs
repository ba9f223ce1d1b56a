use std::path::PathBuf;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Speech model configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Backend that runs inference
    #[serde(default)]
    pub backend: ModelBackendConfig,
    /// Language hint used when a request omits `inputLanguage`
    ///
    /// Leave unset to let the model auto-detect the spoken language.
    #[serde(default)]
    pub default_language: Option<String>,
    /// Upper bound on inferences running at the same time
    #[serde(default = "default_max_concurrent_inferences")]
    pub max_concurrent_inferences: usize,
    /// Abort inference after this many seconds (unbounded when unset)
    #[serde(default)]
    pub inference_timeout_secs: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: ModelBackendConfig::default(),
            default_language: None,
            max_concurrent_inferences: default_max_concurrent_inferences(),
            inference_timeout_secs: None,
        }
    }
}

/// Supported speech model backends
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelBackendConfig {
    /// OpenAI-compatible `/audio/transcriptions` server
    Openai(OpenAiModelConfig),
    /// Local whisper.cpp command line binary
    WhisperCli(WhisperCliConfig),
}

impl Default for ModelBackendConfig {
    fn default() -> Self {
        Self::Openai(OpenAiModelConfig::default())
    }
}

/// Configuration for an OpenAI-compatible Whisper server
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiModelConfig {
    /// Base URL including the API version prefix (e.g. `http://localhost:8000/v1`)
    #[serde(default = "default_openai_base_url")]
    pub base_url: Url,
    /// Bearer token, if the server requires one
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Model identifier sent with every request
    #[serde(default = "default_openai_model")]
    pub model: String,
}

impl Default for OpenAiModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            api_key: None,
            model: default_openai_model(),
        }
    }
}

/// Configuration for the whisper.cpp `whisper-cli` binary
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WhisperCliConfig {
    /// Path to the `whisper-cli` executable
    pub binary: PathBuf,
    /// Path to the ggml model file
    pub model_path: PathBuf,
    /// Worker threads passed with `-t`
    #[serde(default = "default_threads")]
    pub threads: u16,
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_concurrent_inferences() -> usize {
    1
}

fn default_openai_base_url() -> Url {
    Url::parse("http://127.0.0.1:8000/v1").expect("must be a valid URL")
}

fn default_openai_model() -> String {
    "whisper-1".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_threads() -> u16 {
    4
}
