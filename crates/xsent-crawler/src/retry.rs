//! Bounded in-place retries for one strategy.
//!
//! Only transient process failures are retried here. Anything tied to the
//! query itself or to credentials is returned immediately so the crawler can
//! advance or abort.

use std::future::Future;
use std::time::Duration;

use crate::error::HarvestError;

/// Returns `true` for failures worth repeating with the same query.
///
/// **Retriable:** timeouts, rate-limit signals, unexplained non-zero exits.
///
/// **Not retriable:** malformed queries and unreadable output (advance to the
/// next strategy), expired credentials and spawn failures (abort the run).
pub(crate) fn is_retriable(err: &HarvestError) -> bool {
    match err {
        HarvestError::Timeout { .. }
        | HarvestError::RateLimited(_)
        | HarvestError::Failed { .. } => true,
        HarvestError::MalformedQuery(_)
        | HarvestError::Output { .. }
        | HarvestError::AuthExpired(_)
        | HarvestError::Spawn { .. } => false,
    }
}

/// Failures no other strategy can get past.
pub(crate) fn is_fatal(err: &HarvestError) -> bool {
    matches!(
        err,
        HarvestError::AuthExpired(_) | HarvestError::Spawn { .. }
    )
}

/// Runs `operation` with up to `max_retries` additional attempts on retriable errors.
///
/// The delay grows linearly: `step_ms` before the first retry, `2 × step_ms`
/// before the second, and so on. Returns the final result together with the
/// number of invocations made.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    step_ms: u64,
    mut operation: F,
) -> (Result<T, HarvestError>, u32)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, HarvestError>>,
{
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        match operation().await {
            Ok(value) => return (Ok(value), attempts),
            Err(err) => {
                let retries_used = attempts - 1;
                if !is_retriable(&err) || retries_used >= max_retries {
                    return (Err(err), attempts);
                }
                let delay_ms = step_ms.saturating_mul(u64::from(attempts));
                tracing::warn!(
                    attempt = attempts,
                    max_retries,
                    delay_ms,
                    kind = err.kind(),
                    error = %err,
                    "transient harvester failure, retrying"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
