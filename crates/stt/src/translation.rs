//! Secondary text translation
//!
//! Used when the caller wants the transcript in a language the speech
//! model cannot produce natively.

mod mymemory;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use scribe_config::{TranslationConfig, TranslationProviderConfig};
use thiserror::Error;

use crate::types::LanguageCode;

/// Why a translation attempt failed
///
/// Never surfaced to HTTP callers: a failed translation degrades to the
/// untranslated text.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("translation service unreachable: {0}")]
    Connection(String),

    #[error("translation service rejected the request ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("unexpected translation response: {0}")]
    Malformed(String),
}

/// Text translation between two languages
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` into `target`
    async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> Result<String, TranslationError>;

    /// Provider name used in logs and metrics
    fn name(&self) -> &str;
}

/// Build the configured translator; `None` when translation is disabled
pub fn build(config: &TranslationConfig) -> Option<Arc<dyn Translator>> {
    let timeout = Duration::from_secs(config.timeout_secs);

    match &config.provider {
        TranslationProviderConfig::MyMemory(mymemory) => {
            tracing::info!(base_url = %mymemory.base_url, "MyMemory translation enabled");
            Some(Arc::new(mymemory::MyMemoryTranslator::new(mymemory, timeout)))
        }
        TranslationProviderConfig::Disabled => {
            tracing::info!("secondary translation disabled");
            None
        }
    }
}
