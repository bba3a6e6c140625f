//! Language-understanding client: turns a natural-language request into
//! candidate search queries via an OpenAI-compatible chat-completions API
//! (Groq by default).
//!
//! Model output is untrusted. It is parsed leniently here and validated by
//! [`crate::sanitize`] before any candidate becomes a strategy.

use std::future::Future;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use xsent_core::Request;

use crate::error::LlmError;

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 300;

/// What the model proposed for one request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Proposal {
    /// `false` when the model could not interpret the request.
    #[serde(default = "default_valid")]
    pub valid: bool,
    #[serde(default)]
    pub query: String,
    /// Broader variants, most specific first.
    #[serde(default)]
    pub alternatives: Vec<String>,
}

fn default_valid() -> bool {
    true
}

/// Anything that can propose candidate queries for a natural-language request.
pub trait QueryProposer: Send + Sync {
    fn propose(&self, request: &Request) -> impl Future<Output = Result<Proposal, LlmError>> + Send;
}

/// Client for an OpenAI-compatible chat-completions endpoint.
pub struct GroqClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: Url,
    default_window_days: u32,
}

impl GroqClient {
    /// Creates a client pointed at the production Groq API.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the `reqwest::Client` cannot be built, or
    /// [`LlmError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("xsent/0.1 (query-resolution)")
            .build()?;

        let raw = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&raw).map_err(|e| LlmError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            endpoint,
            default_window_days: 30,
        })
    }

    /// Period the model should assume when the request names none. `0` means no default.
    #[must_use]
    pub fn with_default_window_days(mut self, days: u32) -> Self {
        self.default_window_days = days;
        self
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: text.chars().take(200).collect(),
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::Deserialize {
                context: "chat completion".to_string(),
                source: e,
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

impl QueryProposer for GroqClient {
    async fn propose(&self, request: &Request) -> Result<Proposal, LlmError> {
        let prompt = build_prompt(request, Utc::now().date_naive(), self.default_window_days);
        let content = self.complete(&prompt).await?;
        let proposal = parse_proposal(&content)?;
        tracing::debug!(
            request = request.text(),
            query = %proposal.query,
            alternatives = proposal.alternatives.len(),
            "model proposal"
        );
        Ok(proposal)
    }
}

const SYSTEM_PROMPT: &str = "You convert requests about social media posts into X/Twitter advanced \
search queries. Use operators such as from:, to:, since:YYYY-MM-DD, until:YYYY-MM-DD, lang:, \
min_replies:, min_faves:, hashtags, \"exact phrases\", -exclusions and OR. Add lang:id when the \
request is about Indonesian topics. Keep every query under 500 characters. Respond with JSON only.";

/// Builds the user prompt for one request.
#[must_use]
pub fn build_prompt(request: &Request, today: NaiveDate, default_window_days: u32) -> String {
    let period = match request.window() {
        Some(w) => format!(
            "The caller restricted the search to: {}.",
            w.to_operators()
        ),
        None if default_window_days > 0 => format!(
            "Today is {today}. If the request names no period, limit it to the last \
             {default_window_days} days."
        ),
        None => "Do not add date filters unless the request names a period.".to_string(),
    };

    format!(
        "REQUEST: \"{text}\"\n\
         {period}\n\n\
         Reply with a JSON object:\n\
         {{\"valid\": true|false, \"query\": \"<best query>\", \"alternatives\": [\"<broader query>\", ...]}}\n\n\
         Give 1 to 3 alternatives, each broader than the last: first drop the date bounds, then \
         drop exact-match quotes, then drop author restrictions. Set valid to false only if the \
         request cannot be turned into a search.\n\n\
         Examples:\n\
         - \"sentimen pemilu 2024\" -> {{\"valid\": true, \"query\": \"#pemilu2024 lang:id since:2024-01-01\", \"alternatives\": [\"#pemilu2024 lang:id\", \"pemilu 2024\"]}}\n\
         - \"tweet dari jokowi bulan januari\" -> {{\"valid\": true, \"query\": \"from:jokowi lang:id since:2024-01-01 until:2024-01-31\", \"alternatives\": [\"from:jokowi lang:id\", \"jokowi lang:id\"]}}",
        text = request.text(),
    )
}

/// Parses a completion into a [`Proposal`].
///
/// Prefers the JSON object between the first `{` and the last `}`. When the
/// model answered in plain text instead, the first non-empty line is taken as
/// the sole query.
///
/// # Errors
///
/// Returns [`LlmError::EmptyResponse`] when no query text can be recovered.
pub fn parse_proposal(content: &str) -> Result<Proposal, LlmError> {
    if let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) {
        if start < end {
            if let Ok(proposal) = serde_json::from_str::<Proposal>(&content[start..=end]) {
                return Ok(proposal);
            }
            tracing::warn!("LLM reply contained malformed JSON, falling back to first line");
        }
    }

    let line = content
        .lines()
        .map(|l| l.trim().trim_matches('`').trim())
        .find(|l| !l.is_empty())
        .ok_or(LlmError::EmptyResponse)?;

    // A line that is one quoted string is the query itself, not a phrase search.
    let line = if line.len() >= 2
        && line.starts_with('"')
        && line.ends_with('"')
        && line.matches('"').count() == 2
    {
        &line[1..line.len() - 1]
    } else {
        line
    };

    if line.trim().is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(Proposal {
        valid: true,
        query: line.trim().to_string(),
        alternatives: Vec::new(),
    })
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}
