//! Turns a [`Request`] into an ordered, non-empty ladder of search strategies.

use std::cmp::Reverse;
use std::collections::HashSet;

use xsent_core::{Request, ResolvedQuery, StrategyTag};

use crate::error::ResolutionError;
use crate::grammar::{looks_like_grammar, Query};
use crate::llm::QueryProposer;
use crate::sanitize::{sanitize, Candidate, RejectReason};

pub const DEFAULT_MAX_STRATEGIES: usize = 4;

/// Words skipped when reducing a request to its keywords.
const KEYWORD_STOPWORDS: &[&str] = &[
    "tentang",
    "mengenai",
    "dari",
    "pada",
    "di",
    "ke",
    "yang",
    "untuk",
    "dengan",
    "bagaimana",
    "apa",
    "siapa",
    "kapan",
    "dimana",
];

const KEYWORD_LIMIT: usize = 3;

/// Resolves requests into strategies. Without a proposer only requests that
/// already use the search grammar can be resolved.
pub struct QueryResolver<P> {
    proposer: Option<P>,
    max_strategies: usize,
}

impl<P: QueryProposer> QueryResolver<P> {
    #[must_use]
    pub fn new(proposer: Option<P>) -> Self {
        Self {
            proposer,
            max_strategies: DEFAULT_MAX_STRATEGIES,
        }
    }

    /// Caps the total number of strategies, primary included. Clamped to at least 1.
    #[must_use]
    pub fn with_max_strategies(mut self, max: usize) -> Self {
        self.max_strategies = max.max(1);
        self
    }

    #[must_use]
    pub fn understands_natural_language(&self) -> bool {
        self.proposer.is_some()
    }

    /// Resolves `request` into strategies ordered from most to least specific.
    ///
    /// A request already written in the search grammar becomes the primary
    /// strategy verbatim. Anything else is sent to the proposer, whose output
    /// passes the same sanitization as user input.
    ///
    /// # Errors
    ///
    /// - [`ResolutionError::EmptyRequest`] for blank input.
    /// - [`ResolutionError::Unavailable`] when natural language needs a
    ///   proposer that is missing or failed.
    /// - [`ResolutionError::NoValidCandidate`] when every candidate was rejected.
    pub async fn resolve(&self, request: &Request) -> Result<Vec<ResolvedQuery>, ResolutionError> {
        let text = request.text().trim();
        if text.is_empty() {
            return Err(ResolutionError::EmptyRequest);
        }

        let natural = !looks_like_grammar(text);
        let (primary, alternatives) = if natural {
            self.propose(request, text).await?
        } else {
            match sanitize(text) {
                Candidate::Valid(q) => (q, Vec::new()),
                Candidate::Rejected { raw, reason } => {
                    return Err(ResolutionError::NoValidCandidate {
                        request: text.to_string(),
                        rejected: vec![(raw, reason)],
                    });
                }
            }
        };

        let (primary, verbatim) = match request.window() {
            Some(window) if !primary.has_date_bound() => (primary.with_window(window), None),
            _ => (primary, (!natural).then(|| text.to_string())),
        };

        let mut candidates = vec![primary];
        candidates.extend(alternatives);
        if natural || is_too_restrictive(&candidates[0]) {
            let relaxed = relaxations(&candidates[0], text);
            candidates.extend(relaxed);
        }

        let strategies = rank(candidates, verbatim, self.max_strategies);
        tracing::info!(
            request = text,
            natural,
            strategies = strategies.len(),
            primary = strategies.first().map_or("", ResolvedQuery::query),
            "request resolved"
        );
        Ok(strategies)
    }

    async fn propose(
        &self,
        request: &Request,
        text: &str,
    ) -> Result<(Query, Vec<Query>), ResolutionError> {
        let Some(proposer) = &self.proposer else {
            return Err(ResolutionError::Unavailable {
                reason: "no language model configured for natural-language requests".to_string(),
            });
        };

        let proposal = proposer
            .propose(request)
            .await
            .map_err(|e| ResolutionError::Unavailable {
                reason: e.to_string(),
            })?;

        if !proposal.valid {
            return Err(ResolutionError::NoValidCandidate {
                request: text.to_string(),
                rejected: vec![(proposal.query, RejectReason::DeclinedByModel)],
            });
        }

        let mut valid = Vec::new();
        let mut rejected = Vec::new();
        for raw in std::iter::once(&proposal.query).chain(&proposal.alternatives) {
            match sanitize(raw) {
                Candidate::Valid(q) => valid.push(q),
                Candidate::Rejected { raw, reason } => {
                    tracing::warn!(candidate = %raw, reason = %reason, "rejected model candidate");
                    rejected.push((raw, reason));
                }
            }
        }

        if valid.is_empty() {
            return Err(ResolutionError::NoValidCandidate {
                request: text.to_string(),
                rejected,
            });
        }
        let primary = valid.remove(0);
        Ok((primary, valid))
    }
}

/// Many filters or a window shorter than three days tend to return nothing.
fn is_too_restrictive(query: &Query) -> bool {
    query.filter_count() >= 3 || query.date_span_days().is_some_and(|d| d < 3)
}

/// Cumulative relaxations of `primary`: dates, exact phrases, authors,
/// language, then a keyword-only query built from the request text.
fn relaxations(primary: &Query, request_text: &str) -> Vec<Query> {
    let steps: [fn(&Query) -> Query; 4] = [
        Query::without_dates,
        Query::without_phrases,
        Query::without_authors,
        Query::without_lang,
    ];

    let mut out = Vec::new();
    let mut current = primary.clone();
    for step in steps {
        let next = step(&current);
        if next != current && next.has_search_term() {
            out.push(next.clone());
            current = next;
        }
    }
    if let Some(keywords) = keyword_only(request_text) {
        out.push(keywords);
    }
    out
}

/// The first few meaningful words of the request, with operators stripped.
fn keyword_only(text: &str) -> Option<Query> {
    let words: Vec<String> = text
        .split_whitespace()
        .filter(|t| !t.contains(':') && !t.starts_with('-') && !t.starts_with('@'))
        .map(|t| {
            t.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|w| w.chars().count() > 2 && !KEYWORD_STOPWORDS.contains(&w.as_str()))
        .take(KEYWORD_LIMIT)
        .collect();

    if words.is_empty() {
        None
    } else {
        Some(Query::parse(&words.join(" ")))
    }
}

/// Deduplicates, drops anything more specific than the primary, orders the
/// rest by decreasing specificity and tags each position. `verbatim` replaces
/// the rendered primary when the user already wrote it in the grammar.
fn rank(candidates: Vec<Query>, verbatim: Option<String>, max: usize) -> Vec<ResolvedQuery> {
    let mut iter = candidates.into_iter();
    let Some(primary) = iter.next() else {
        return Vec::new();
    };
    let ceiling = primary.specificity();
    let canonical = primary.to_string();

    let mut seen = HashSet::new();
    seen.insert(canonical.clone());
    let primary = ResolvedQuery::new(
        verbatim.unwrap_or(canonical),
        StrategyTag::Primary,
        ceiling,
    );

    let mut fallbacks: Vec<Query> = iter
        .filter(|q| {
            if q.specificity() > ceiling {
                tracing::debug!(candidate = %q, "dropping candidate more specific than primary");
                return false;
            }
            seen.insert(q.to_string())
        })
        .collect();
    fallbacks.sort_by_key(|q| Reverse(q.specificity()));

    std::iter::once(primary)
        .chain(
            fallbacks
                .into_iter()
                .enumerate()
                .map(|(i, q)| {
                    ResolvedQuery::new(q.to_string(), StrategyTag::for_index(i + 1), q.specificity())
                }),
        )
        .take(max)
        .collect()
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
