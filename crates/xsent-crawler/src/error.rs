use std::fmt;

use thiserror::Error;
use xsent_core::StrategyTag;

/// Failure of one harvester invocation, categorised so the crawler can decide
/// whether to retry, move on, or stop.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("harvester rate limited: {0}")]
    RateLimited(String),

    #[error("harvester credentials rejected: {0}")]
    AuthExpired(String),

    #[error("harvester rejected the query: {0}")]
    MalformedQuery(String),

    #[error("harvester timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("harvester exited with {}: {stderr}", exit_label(.code))]
    Failed { code: Option<i32>, stderr: String },

    #[error("failed to run harvester '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Output {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

#[allow(clippy::ref_option)]
fn exit_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| format!("status {c}"))
}

impl HarvestError {
    /// Short category name for logs and failure summaries.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            HarvestError::RateLimited(_) => "rate-limited",
            HarvestError::AuthExpired(_) => "auth-expired",
            HarvestError::MalformedQuery(_) => "malformed-query",
            HarvestError::Timeout { .. } => "timeout",
            HarvestError::Failed { .. } => "unknown",
            HarvestError::Spawn { .. } => "spawn",
            HarvestError::Output { .. } => "bad-output",
        }
    }
}

/// Why one strategy was abandoned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    NoResults,
    Insufficient { count: usize, threshold: usize },
    Harvest { kind: &'static str, message: String },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NoResults => f.write_str("no posts returned"),
            FailureReason::Insufficient { count, threshold } => {
                write!(f, "{count} posts, below threshold of {threshold}")
            }
            FailureReason::Harvest { kind, message } => write!(f, "{kind}: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyFailure {
    pub strategy: StrategyTag,
    pub query: String,
    /// Harvester invocations spent on this strategy, retries included.
    pub attempts: u32,
    pub reason: FailureReason,
}

impl fmt::Display for StrategyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} `{}` ({} attempt{}): {}",
            self.strategy,
            self.query,
            self.attempts,
            if self.attempts == 1 { "" } else { "s" },
            self.reason
        )
    }
}

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("no strategies to crawl")]
    NoStrategies,

    #[error("no results found after exhausting {} strategies", .failures.len())]
    Exhausted { failures: Vec<StrategyFailure> },

    #[error("harvester unavailable while running {strategy} `{query}`: {source}")]
    Unavailable {
        strategy: StrategyTag,
        query: String,
        /// Strategies that had already failed before the abort.
        failures: Vec<StrategyFailure>,
        #[source]
        source: HarvestError,
    },

    #[error("crawl cancelled")]
    Cancelled,
}
