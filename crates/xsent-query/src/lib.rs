//! Query resolution: turns a free-form request into an ordered ladder of
//! search strategies in the upstream search grammar.

pub mod error;
pub mod grammar;
pub mod llm;
pub mod resolver;
pub mod sanitize;

pub use error::{LlmError, ResolutionError};
pub use grammar::{looks_like_grammar, Query};
pub use llm::{GroqClient, Proposal, QueryProposer};
pub use resolver::{QueryResolver, DEFAULT_MAX_STRATEGIES};
pub use sanitize::{sanitize, Candidate, RejectReason, MAX_QUERY_LEN};
