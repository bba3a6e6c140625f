//! Single-text classification: clean, normalize slang, translate, score.

use xsent_core::SentimentLabel;

use crate::lexicon::{label_for, valence_score, DEFAULT_THRESHOLD};
use crate::slang::SlangNormalizer;
use crate::text::clean;
use crate::translator::Translator;

/// Intermediate and final results for one text.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub normalized_text: String,
    /// The text that was scored: the translation, or the normalized text
    /// when translation was skipped or failed.
    pub pivot_text: String,
    pub translated: bool,
    pub label: SentimentLabel,
    pub score: f32,
}

pub struct Classifier<T> {
    normalizer: SlangNormalizer,
    translator: Option<T>,
    threshold: f32,
}

impl<T: Translator> Classifier<T> {
    /// `translator = None` scores the normalized text directly.
    #[must_use]
    pub fn new(normalizer: SlangNormalizer, translator: Option<T>) -> Self {
        Self {
            normalizer,
            translator,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold.abs();
        self
    }

    #[must_use]
    pub fn normalizer(&self) -> &SlangNormalizer {
        &self.normalizer
    }

    /// Runs the full per-text pipeline. Never fails: a translation error
    /// falls back to scoring the normalized text.
    pub async fn classify_text(&self, text: &str) -> Classification {
        let normalized_text = self.normalizer.normalize(&clean(text));
        if normalized_text.is_empty() {
            tracing::debug!("text is empty after cleaning, classifying as neutral");
            return Classification {
                normalized_text,
                pivot_text: String::new(),
                translated: false,
                label: SentimentLabel::Neutral,
                score: 0.0,
            };
        }

        let (pivot_text, translated) = match &self.translator {
            Some(translator) => match translator.translate(&normalized_text).await {
                Ok(t) if !t.trim().is_empty() => (t, true),
                Ok(_) => {
                    tracing::warn!("empty translation, scoring normalized text");
                    (normalized_text.clone(), false)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "translation failed, scoring normalized text");
                    (normalized_text.clone(), false)
                }
            },
            None => (normalized_text.clone(), false),
        };

        let score = valence_score(&pivot_text);
        Classification {
            label: label_for(score, self.threshold),
            normalized_text,
            pivot_text,
            translated,
            score,
        }
    }

    /// Label and confidence for one standalone text.
    ///
    /// A single text is its own batch, so confidence is `1.0` for any
    /// non-zero score and `0.0` otherwise.
    pub async fn classify(&self, text: &str) -> (SentimentLabel, f32) {
        let c = self.classify_text(text).await;
        let confidence = if c.score.abs() > 0.0 { 1.0 } else { 0.0 };
        (c.label, confidence)
    }
}
