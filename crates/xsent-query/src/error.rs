use thiserror::Error;

use crate::sanitize::RejectReason;

/// Errors from the language-model client.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("LLM returned an empty completion")]
    EmptyResponse,

    #[error("invalid LLM base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Terminal failure to turn a request into at least one search strategy.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("request is empty")]
    EmptyRequest,

    /// The language-understanding service is not configured or did not answer.
    #[error("query service unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("no valid query could be produced for '{request}'")]
    NoValidCandidate {
        request: String,
        rejected: Vec<(String, RejectReason)>,
    },
}
