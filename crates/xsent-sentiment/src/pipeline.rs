//! Batch classification of harvested posts.

use futures::stream::{self, StreamExt};
use xsent_core::{Cancellation, ClassifiedPost, Post};

use crate::classifier::Classifier;
use crate::error::SentimentError;
use crate::translator::Translator;

/// Classifies `posts` with up to `workers` texts in flight, preserving input
/// order. Confidence is each `|score|` relative to the largest magnitude in
/// the batch (`0.0` when every score is zero).
///
/// # Errors
///
/// Returns [`SentimentError::Cancelled`] when `cancel` fires first.
pub async fn classify_batch<T: Translator>(
    classifier: &Classifier<T>,
    posts: Vec<Post>,
    workers: usize,
    cancel: &Cancellation,
) -> Result<Vec<ClassifiedPost>, SentimentError> {
    if cancel.is_cancelled() {
        return Err(SentimentError::Cancelled);
    }
    let total = posts.len();

    let work = stream::iter(posts)
        .map(|post| async move {
            let classification = classifier.classify_text(&post.text).await;
            (post, classification)
        })
        .buffered(workers.max(1))
        .collect::<Vec<_>>();

    let results = tokio::select! {
        biased;
        () = cancel.cancelled() => return Err(SentimentError::Cancelled),
        results = work => results,
    };

    let max = results
        .iter()
        .map(|(_, c)| c.score.abs())
        .fold(0.0_f32, f32::max);
    let translated = results.iter().filter(|(_, c)| c.translated).count();
    tracing::info!(total, translated, "batch classified");

    Ok(results
        .into_iter()
        .map(|(post, c)| ClassifiedPost {
            post,
            confidence: if max > 0.0 { c.score.abs() / max } else { 0.0 },
            normalized_text: c.normalized_text,
            pivot_text: c.pivot_text,
            translated: c.translated,
            label: c.label,
            score: c.score,
        })
        .collect())
}
