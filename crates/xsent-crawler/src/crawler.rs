//! Adaptive crawl over a ladder of strategies.
//!
//! The run is an explicit state machine:
//!
//! ```text
//! Attempting(0) ──enough posts──▶ Succeeded
//!      │
//!      ├─ too few / none / malformed / retries spent ──▶ Attempting(i + 1)
//!      ├─ auth expired / cannot spawn ──▶ abort (Unavailable)
//!      └─ i == len ──▶ Exhausted ──partial posts kept──▶ Succeeded (partial)
//!                                 └─ nothing kept ──▶ CrawlError::Exhausted
//! ```
//!
//! Strategies are strictly sequential; the cancellation signal is checked
//! before each attempt and raced against every harvester call.

use serde::Serialize;
use xsent_core::{Cancellation, Post, ResolvedQuery};

use crate::error::{CrawlError, FailureReason, HarvestError, StrategyFailure};
use crate::harvester::Harvester;
use crate::retry::{is_fatal, retry_with_backoff};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrawlerOptions {
    /// Fraction of the target a strategy must return to succeed.
    pub min_fraction: f64,
    /// In-place retries per strategy for transient failures.
    pub max_retries: u32,
    /// Linear backoff step between retries.
    pub retry_delay_ms: u64,
}

impl Default for CrawlerOptions {
    fn default() -> Self {
        Self {
            min_fraction: 0.2,
            max_retries: 2,
            retry_delay_ms: 2_000,
        }
    }
}

/// Result of a successful crawl.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlOutcome {
    pub posts: Vec<Post>,
    /// The strategy whose posts were kept.
    pub strategy: ResolvedQuery,
    /// `true` when no strategy reached the threshold and the largest
    /// below-threshold result was kept instead.
    pub partial: bool,
    /// Harvester invocations across all strategies, retries included.
    pub attempts: u32,
    #[serde(skip)]
    pub failures: Vec<StrategyFailure>,
}

#[derive(Debug)]
enum CrawlState {
    Attempting(usize),
    Succeeded {
        index: usize,
        posts: Vec<Post>,
        partial: bool,
    },
    Exhausted,
}

pub struct AdaptiveCrawler<H> {
    harvester: H,
    options: CrawlerOptions,
}

impl<H: Harvester> AdaptiveCrawler<H> {
    #[must_use]
    pub fn new(harvester: H, options: CrawlerOptions) -> Self {
        Self { harvester, options }
    }

    /// Minimum post count for a strategy to succeed: `ceil(target × fraction)`, at least 1.
    #[must_use]
    pub fn threshold(&self, target: u32) -> usize {
        let fraction = self.options.min_fraction.clamp(0.0, 1.0);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let needed = (f64::from(target) * fraction).ceil() as usize;
        needed.max(1)
    }

    /// Tries `strategies` in order until one returns at least
    /// [`threshold`](Self::threshold) posts.
    ///
    /// # Errors
    ///
    /// - [`CrawlError::NoStrategies`] for an empty ladder.
    /// - [`CrawlError::Exhausted`] when every strategy failed and none returned any posts.
    /// - [`CrawlError::Unavailable`] when the harvester cannot run at all.
    /// - [`CrawlError::Cancelled`] when `cancel` fires.
    pub async fn crawl(
        &self,
        strategies: &[ResolvedQuery],
        target: u32,
        cancel: &Cancellation,
    ) -> Result<CrawlOutcome, CrawlError> {
        if strategies.is_empty() {
            return Err(CrawlError::NoStrategies);
        }

        let threshold = self.threshold(target);
        let mut failures: Vec<StrategyFailure> = Vec::new();
        let mut best_partial: Option<(usize, Vec<Post>)> = None;
        let mut total_attempts = 0u32;
        let mut state = CrawlState::Attempting(0);

        loop {
            state = match state {
                CrawlState::Attempting(index) if index >= strategies.len() => CrawlState::Exhausted,
                CrawlState::Attempting(index) => {
                    if cancel.is_cancelled() {
                        return Err(CrawlError::Cancelled);
                    }
                    let strategy = &strategies[index];
                    tracing::info!(
                        strategy = %strategy.strategy(),
                        query = strategy.query(),
                        target,
                        threshold,
                        "attempting strategy"
                    );

                    let (result, attempts) = tokio::select! {
                        biased;
                        () = cancel.cancelled() => return Err(CrawlError::Cancelled),
                        out = self.attempt(strategy, target) => out,
                    };
                    total_attempts += attempts;

                    let fail = |reason: FailureReason| StrategyFailure {
                        strategy: strategy.strategy(),
                        query: strategy.query().to_string(),
                        attempts,
                        reason,
                    };

                    match result {
                        Ok(posts) if posts.len() >= threshold => CrawlState::Succeeded {
                            index,
                            posts,
                            partial: false,
                        },
                        Ok(posts) => {
                            let reason = if posts.is_empty() {
                                FailureReason::NoResults
                            } else {
                                FailureReason::Insufficient {
                                    count: posts.len(),
                                    threshold,
                                }
                            };
                            tracing::warn!(
                                strategy = %strategy.strategy(),
                                count = posts.len(),
                                threshold,
                                "strategy below threshold, advancing"
                            );
                            failures.push(fail(reason));
                            if !posts.is_empty()
                                && best_partial
                                    .as_ref()
                                    .is_none_or(|(_, best)| posts.len() > best.len())
                            {
                                best_partial = Some((index, posts));
                            }
                            CrawlState::Attempting(index + 1)
                        }
                        Err(err) if is_fatal(&err) => {
                            tracing::warn!(
                                strategy = %strategy.strategy(),
                                kind = err.kind(),
                                error = %err,
                                "harvester unavailable, aborting crawl"
                            );
                            return Err(CrawlError::Unavailable {
                                strategy: strategy.strategy(),
                                query: strategy.query().to_string(),
                                failures,
                                source: err,
                            });
                        }
                        Err(err) => {
                            tracing::warn!(
                                strategy = %strategy.strategy(),
                                kind = err.kind(),
                                error = %err,
                                "strategy failed, advancing"
                            );
                            failures.push(fail(harvest_reason(&err)));
                            CrawlState::Attempting(index + 1)
                        }
                    }
                }
                CrawlState::Succeeded {
                    index,
                    posts,
                    partial,
                } => {
                    let strategy = strategies[index].clone();
                    tracing::info!(
                        strategy = %strategy.strategy(),
                        count = posts.len(),
                        partial,
                        attempts = total_attempts,
                        "crawl succeeded"
                    );
                    return Ok(CrawlOutcome {
                        posts,
                        strategy,
                        partial,
                        attempts: total_attempts,
                        failures,
                    });
                }
                CrawlState::Exhausted => match best_partial.take() {
                    Some((index, posts)) => CrawlState::Succeeded {
                        index,
                        posts,
                        partial: true,
                    },
                    None => {
                        tracing::warn!(
                            strategies = strategies.len(),
                            attempts = total_attempts,
                            "all strategies exhausted"
                        );
                        return Err(CrawlError::Exhausted { failures });
                    }
                },
            };
        }
    }

    async fn attempt(
        &self,
        strategy: &ResolvedQuery,
        target: u32,
    ) -> (Result<Vec<Post>, HarvestError>, u32) {
        retry_with_backoff(
            self.options.max_retries,
            self.options.retry_delay_ms,
            || self.harvester.harvest(strategy.query(), target),
        )
        .await
    }
}

fn harvest_reason(err: &HarvestError) -> FailureReason {
    FailureReason::Harvest {
        kind: err.kind(),
        message: err.to_string(),
    }
}

#[cfg(test)]
#[path = "crawler_test.rs"]
mod tests;
