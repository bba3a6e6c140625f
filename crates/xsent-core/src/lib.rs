//! Shared domain types, configuration, and run cancellation for xsent.

pub mod app_config;
pub mod cancel;
pub mod config;
pub mod slang_file;
pub mod types;

use chrono::NaiveDate;
use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use cancel::{CancelHandle, Cancellation};
pub use config::{load_app_config, load_app_config_from_env};
pub use slang_file::{load_slang_file, parse_slang_file, SlangFile};
pub use types::{
    ClassifiedPost, Post, Request, ResolvedQuery, SentimentLabel, StrategyTag, TimeWindow,
};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid sentiment label: {0}")]
    InvalidLabel(String),

    #[error("invalid time window: since {since} is after until {until}")]
    InvalidTimeWindow { since: NaiveDate, until: NaiveDate },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read slang file {path}: {source}")]
    SlangFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse slang file: {0}")]
    SlangFileParse(#[from] serde_yaml::Error),

    #[error("slang validation error: {0}")]
    Validation(String),
}
