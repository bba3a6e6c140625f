//! Sentiment classification and aggregation for Indonesian social posts:
//! slang normalization, translation to an English pivot, lexicon scoring,
//! and per-label reporting.

pub mod aggregate;
pub mod classifier;
pub mod error;
pub mod lexicon;
pub mod pipeline;
pub mod slang;
pub mod stopwords;
pub mod text;
pub mod translator;

pub use aggregate::{
    aggregate, AggregateOptions, EngagementSummary, KeywordCount, LabelSummary, SentimentReport,
};
pub use classifier::{Classification, Classifier};
pub use error::{SentimentError, TranslationError};
pub use lexicon::{label_for, valence_score, DEFAULT_THRESHOLD};
pub use pipeline::classify_batch;
pub use slang::SlangNormalizer;
pub use text::clean;
pub use translator::{GoogleTranslator, Translator};
