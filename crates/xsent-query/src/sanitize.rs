//! Validation boundary for candidate queries. Every candidate, whether typed by
//! the user or proposed by the model, passes through [`sanitize`] before it can
//! become a strategy.

use std::fmt;

use crate::grammar::Query;

pub const MAX_QUERY_LEN: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    Empty,
    TooLong { len: usize },
    ControlCharacter,
    UnbalancedQuotes,
    NoSearchTerm,
    DeclinedByModel,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Empty => f.write_str("empty query"),
            RejectReason::TooLong { len } => {
                write!(f, "query is {len} characters, limit is {MAX_QUERY_LEN}")
            }
            RejectReason::ControlCharacter => f.write_str("contains a control character"),
            RejectReason::UnbalancedQuotes => f.write_str("unbalanced double quotes"),
            RejectReason::NoSearchTerm => f.write_str("no keyword, hashtag or author to search"),
            RejectReason::DeclinedByModel => f.write_str("model could not interpret the request"),
        }
    }
}

/// Outcome of the validation boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    Valid(Query),
    Rejected { raw: String, reason: RejectReason },
}

impl Candidate {
    fn rejected(raw: &str, reason: RejectReason) -> Self {
        Candidate::Rejected {
            raw: raw.to_string(),
            reason,
        }
    }
}

/// Validates a raw candidate string and parses it into a [`Query`].
#[must_use]
pub fn sanitize(raw: &str) -> Candidate {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Candidate::rejected(raw, RejectReason::Empty);
    }
    let len = trimmed.chars().count();
    if len > MAX_QUERY_LEN {
        return Candidate::rejected(raw, RejectReason::TooLong { len });
    }
    if trimmed.chars().any(char::is_control) {
        return Candidate::rejected(raw, RejectReason::ControlCharacter);
    }
    if trimmed.matches('"').count() % 2 != 0 {
        return Candidate::rejected(raw, RejectReason::UnbalancedQuotes);
    }

    let query = Query::parse(trimmed);
    if !query.has_search_term() {
        return Candidate::rejected(raw, RejectReason::NoSearchTerm);
    }
    Candidate::Valid(query)
}
