//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use scribe_config::{
    Config, CorsConfig, HealthConfig, ModelBackendConfig, ModelConfig, MyMemoryConfig, OpenAiModelConfig,
    ServerConfig, TranslationConfig, TranslationProviderConfig,
};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    ///
    /// Secondary translation starts disabled so no test reaches the
    /// public MyMemory API.
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig {
                        enabled: true,
                        ..HealthConfig::default()
                    },
                    ..ServerConfig::default()
                },
                model: ModelConfig::default(),
                translation: TranslationConfig {
                    provider: TranslationProviderConfig::Disabled,
                    ..TranslationConfig::default()
                },
                telemetry: None,
            },
        }
    }

    /// Point the OpenAI-compatible model backend at a mock server
    pub fn with_openai_model(mut self, base_url: &str) -> Self {
        self.config.model.backend = ModelBackendConfig::Openai(OpenAiModelConfig {
            base_url: base_url.parse().expect("valid URL"),
            api_key: None,
            model: "whisper-1".to_owned(),
        });
        self
    }

    /// Enable MyMemory translation against a mock server
    pub fn with_translator(mut self, base_url: &str) -> Self {
        self.config.translation.provider = TranslationProviderConfig::MyMemory(MyMemoryConfig {
            base_url: base_url.parse().expect("valid URL"),
            email: None,
        });
        self
    }

    /// Bound each model invocation
    pub fn with_inference_timeout(mut self, secs: u64) -> Self {
        self.config.model.inference_timeout_secs = Some(secs);
        self
    }

    /// Assume this spoken language when requests name none
    pub fn with_default_language(mut self, code: &str) -> Self {
        self.config.model.default_language = Some(code.to_owned());
        self
    }

    /// Set the upload size limit
    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.server.max_upload_bytes = bytes;
        self
    }

    /// Set CORS configuration
    pub fn with_cors(mut self, config: CorsConfig) -> Self {
        self.config.server.cors = config;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
