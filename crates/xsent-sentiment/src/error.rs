use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected translation response: {0}")]
    Shape(String),

    #[error("translation came back empty")]
    Empty,

    #[error("translator is shut down")]
    Closed,
}

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("slang pattern error: {0}")]
    SlangPattern(#[from] regex::Error),

    #[error("classification cancelled")]
    Cancelled,
}
