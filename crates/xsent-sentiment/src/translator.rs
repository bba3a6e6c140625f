//! Translation of normalized Indonesian text into the English pivot language.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;
use tokio::sync::Semaphore;

use crate::error::TranslationError;

const DEFAULT_BASE_URL: &str = "https://translate.googleapis.com";

/// Anything that can translate one text into the pivot language.
pub trait Translator: Send + Sync {
    fn translate(&self, text: &str)
        -> impl Future<Output = Result<String, TranslationError>> + Send;
}

/// Client for the public Google Translate `translate_a/single` endpoint.
///
/// Concurrent calls are capped by a shared semaphore; clones share it.
#[derive(Clone)]
pub struct GoogleTranslator {
    client: Client,
    base_url: String,
    source: String,
    target: String,
    permits: Arc<Semaphore>,
}

impl GoogleTranslator {
    /// # Errors
    ///
    /// Returns [`TranslationError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(timeout_secs: u64, max_concurrent: usize) -> Result<Self, TranslationError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout_secs, max_concurrent)
    }

    /// Creates a translator with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError::Http`] if the `reqwest::Client` cannot be built.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        max_concurrent: usize,
    ) -> Result<Self, TranslationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("xsent/0.1 (translation)")
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            source: "id".to_string(),
            target: "en".to_string(),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        })
    }

    #[must_use]
    pub fn with_languages(mut self, source: &str, target: &str) -> Self {
        self.source = source.to_string();
        self.target = target.to_string();
        self
    }

    fn url(&self, text: &str) -> String {
        let encoded = utf8_percent_encode(text, NON_ALPHANUMERIC);
        format!(
            "{}/translate_a/single?client=gtx&sl={}&tl={}&dt=t&q={encoded}",
            self.base_url, self.source, self.target
        )
    }
}

impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str) -> Result<String, TranslationError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| TranslationError::Closed)?;

        let body = self
            .client
            .get(self.url(text))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| TranslationError::Deserialize {
                context: "translate_a/single".to_string(),
                source: e,
            })?;
        let translated = parse_segments(&value)?;
        if translated.trim().is_empty() {
            return Err(TranslationError::Empty);
        }
        Ok(translated)
    }
}

/// Concatenates the translated segments of a `translate_a/single` response.
///
/// The response is a nested array whose first element lists segments as
/// `[translated, original, ...]`.
fn parse_segments(value: &serde_json::Value) -> Result<String, TranslationError> {
    let segments = value
        .get(0)
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| TranslationError::Shape("missing segment list".to_string()))?;

    Ok(segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(serde_json::Value::as_str))
        .collect::<String>())
}
