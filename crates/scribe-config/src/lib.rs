#![allow(clippy::must_use_candidate)]

pub mod cors;
mod env;
pub mod health;
mod loader;
pub mod model;
pub mod server;
pub mod telemetry;
pub mod translation;

use serde::Deserialize;

pub use cors::*;
pub use health::*;
pub use model::*;
pub use server::*;
pub use telemetry::TelemetryConfig;
pub use translation::*;

/// Top-level scribe configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Speech model configuration
    #[serde(default)]
    pub model: ModelConfig,
    /// Secondary translation configuration
    #[serde(default)]
    pub translation: TranslationConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
