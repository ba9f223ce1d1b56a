use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scribe_config::MyMemoryConfig;
use serde::Deserialize;

use super::{TranslationError, Translator};
use crate::{http_client::http_client, types::LanguageCode};

/// Translator backed by the MyMemory `GET /get` API
pub(super) struct MyMemoryTranslator {
    client: Client,
    endpoint: String,
    email: Option<String>,
    timeout: Duration,
}

impl MyMemoryTranslator {
    pub fn new(config: &MyMemoryConfig, timeout: Duration) -> Self {
        Self {
            client: http_client(),
            endpoint: format!("{}/get", config.base_url.as_str().trim_end_matches('/')),
            email: config.email.clone(),
            timeout,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryResponse {
    response_data: Option<ResponseData>,
    /// Reported as a number on success and sometimes as a string on errors
    response_status: serde_json::Value,
    #[serde(default)]
    response_details: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    translated_text: Option<String>,
}

fn status_of(value: &serde_json::Value) -> Option<u16> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[async_trait]
impl Translator for MyMemoryTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> Result<String, TranslationError> {
        let langpair = format!("{source}|{target}");

        let mut query = vec![("q", text), ("langpair", langpair.as_str())];
        if let Some(email) = &self.email {
            query.push(("de", email.as_str()));
        }

        tracing::debug!("MyMemory request: {langpair}, {} chars", text.chars().count());

        let response = self
            .client
            .get(&self.endpoint)
            .query(&query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| TranslationError::Connection(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TranslationError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let body: MyMemoryResponse = response
            .json()
            .await
            .map_err(|e| TranslationError::Malformed(e.to_string()))?;

        match status_of(&body.response_status) {
            Some(200) => {}
            Some(code) => {
                return Err(TranslationError::Provider {
                    status: code,
                    message: body.response_details.unwrap_or_default(),
                });
            }
            None => {
                return Err(TranslationError::Malformed(format!(
                    "responseStatus {}",
                    body.response_status
                )));
            }
        }

        body.response_data
            .and_then(|data| data.translated_text)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| TranslationError::Malformed("empty translatedText".to_string()))
    }

    fn name(&self) -> &str {
        "mymemory"
    }
}
