//! Discord webhook delivery of a rendered report.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;

/// Discord's per-message content limit.
pub(crate) const MAX_MESSAGE_CHARS: usize = 2000;

#[derive(Debug, Error)]
pub(crate) enum DeliveryError {
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook returned status {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Serialize)]
struct WebhookMessage<'a> {
    content: &'a str,
}

pub(crate) struct DiscordWebhook {
    client: Client,
    url: String,
    max_retries: u32,
    retry_delay_ms: u64,
}

impl DiscordWebhook {
    /// # Errors
    ///
    /// Returns [`DeliveryError::Http`] if the `reqwest::Client` cannot be built.
    pub(crate) fn new(url: &str, retry_delay_ms: u64) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("xsent/0.1 (report-delivery)")
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
            max_retries: 3,
            retry_delay_ms,
        })
    }

    /// Posts `report` as one or more messages, in order. Returns the number sent.
    ///
    /// # Errors
    ///
    /// Returns the last [`DeliveryError`] once a message runs out of retries.
    pub(crate) async fn send_report(&self, report: &str) -> Result<usize, DeliveryError> {
        let chunks = split_message(report, MAX_MESSAGE_CHARS);
        for chunk in &chunks {
            self.send_with_retry(chunk).await?;
        }
        Ok(chunks.len())
    }

    async fn send_with_retry(&self, content: &str) -> Result<(), DeliveryError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let err = match self.send_once(content).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt <= self.max_retries && is_retriable(&e) => e,
                Err(e) => return Err(e),
            };
            let delay_ms = self.retry_delay_ms.saturating_mul(u64::from(attempt));
            tracing::warn!(attempt, delay_ms, error = %err, "webhook delivery failed, retrying");
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }

    async fn send_once(&self, content: &str) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookMessage { content })
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::Status {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        })
    }
}

fn is_retriable(err: &DeliveryError) -> bool {
    match err {
        DeliveryError::Http(_) => true,
        DeliveryError::Status { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
        }
    }
}

/// Splits `text` into pieces of at most `max` characters, preferring line breaks.
pub(crate) fn split_message(text: &str, max: usize) -> Vec<String> {
    let max = max.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for line in text.lines() {
        let line_len = line.chars().count();
        let needed = if current.is_empty() { line_len } else { line_len + 1 };
        if current_len + needed <= max {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
            current_len += needed;
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len <= max {
            current.push_str(line);
            current_len = line_len;
        } else {
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(max) {
                chunks.push(piece.iter().collect());
            }
        }
    }
    if !current.trim().is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn webhook(server: &MockServer) -> DiscordWebhook {
        DiscordWebhook::new(&format!("{}/api/webhooks/1/token", server.uri()), 0).unwrap()
    }

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_message("a\nb", 2000), vec!["a\nb".to_string()]);
    }

    #[test]
    fn chunks_respect_limit_and_keep_lines_whole() {
        let text = format!("{}\n{}\n{}", "a".repeat(6), "b".repeat(3), "c".repeat(4));
        let chunks = split_message(&text, 10);
        assert_eq!(chunks, vec!["aaaaaa\nbbb", "cccc"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
    }

    #[test]
    fn overlong_line_is_hard_split() {
        let chunks = split_message(&"x".repeat(25), 10);
        assert_eq!(
            chunks.iter().map(String::len).collect::<Vec<_>>(),
            vec![10, 10, 5]
        );
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(split_message("", 2000).is_empty());
    }

    #[tokio::test]
    async fn report_is_posted_as_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/webhooks/1/token"))
            .and(body_json(serde_json::json!({"content": "# Sentiment Report"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let sent = webhook(&server).send_report("# Sentiment Report").await.unwrap();
        assert_eq!(sent, 1);
    }

    #[tokio::test]
    async fn rate_limited_message_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let sent = webhook(&server).send_report("halo").await.unwrap();
        assert_eq!(sent, 1);
    }

    #[tokio::test]
    async fn client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad payload"))
            .expect(1)
            .mount(&server)
            .await;

        let err = webhook(&server).send_report("halo").await.unwrap_err();
        assert!(matches!(err, DeliveryError::Status { status: 400, .. }));
    }
}
