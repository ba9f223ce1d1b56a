use std::path::Path;

use crate::{Config, ModelBackendConfig};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let config = Self::parse(&raw)?;

        tracing::debug!(path = %path.display(), "configuration loaded");

        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if a limit is zero or a field is blank
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_server()?;
        self.validate_model()?;
        self.validate_translation()?;
        Ok(())
    }

    fn validate_server(&self) -> anyhow::Result<()> {
        if self.server.max_upload_bytes == 0 {
            anyhow::bail!("server.max_upload_bytes must be greater than 0");
        }

        if self.server.health.enabled && !self.server.health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/'");
        }

        let cors = &self.server.cors;
        if cors.enabled && cors.credentials && cors.origins == crate::AnyOrArray::Any {
            anyhow::bail!("server.cors.credentials cannot be combined with wildcard origins");
        }

        Ok(())
    }

    fn validate_model(&self) -> anyhow::Result<()> {
        if self.model.max_concurrent_inferences == 0 {
            anyhow::bail!("model.max_concurrent_inferences must be at least 1");
        }

        if self.model.inference_timeout_secs == Some(0) {
            anyhow::bail!("model.inference_timeout_secs must be greater than 0");
        }

        if let Some(ref language) = self.model.default_language
            && language.trim().is_empty()
        {
            anyhow::bail!("model.default_language must not be blank");
        }

        match &self.model.backend {
            ModelBackendConfig::Openai(openai) if openai.model.trim().is_empty() => {
                anyhow::bail!("model.backend.model must not be blank");
            }
            ModelBackendConfig::WhisperCli(cli) if cli.threads == 0 => {
                anyhow::bail!("model.backend.threads must be at least 1");
            }
            _ => {}
        }

        Ok(())
    }

    fn validate_translation(&self) -> anyhow::Result<()> {
        if self.translation.timeout_secs == 0 {
            anyhow::bail!("translation.timeout_secs must be greater than 0");
        }

        Ok(())
    }
}
