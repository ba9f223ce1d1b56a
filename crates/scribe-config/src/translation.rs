use serde::Deserialize;
use url::Url;

/// Secondary translation configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranslationConfig {
    /// Translation provider
    #[serde(default)]
    pub provider: TranslationProviderConfig,
    /// Give up on a translation call after this many seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProviderConfig::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Supported translation providers
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranslationProviderConfig {
    /// MyMemory public translation API
    #[serde(rename = "mymemory")]
    MyMemory(MyMemoryConfig),
    /// Never run a secondary translation
    Disabled,
}

impl Default for TranslationProviderConfig {
    fn default() -> Self {
        Self::MyMemory(MyMemoryConfig::default())
    }
}

/// MyMemory provider settings
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MyMemoryConfig {
    /// API base URL
    #[serde(default = "default_mymemory_url")]
    pub base_url: Url,
    /// Contact email; MyMemory grants a larger daily quota when present
    #[serde(default)]
    pub email: Option<String>,
}

impl Default for MyMemoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_mymemory_url(),
            email: None,
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_timeout_secs() -> u64 {
    10
}

fn default_mymemory_url() -> Url {
    Url::parse("https://api.mymemory.translated.net").expect("must be a valid URL")
}
