//! Aggregation of classified posts into a sentiment report.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use xsent_core::{ClassifiedPost, SentimentLabel};

use crate::stopwords::is_stopword;
use crate::text::tokenize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateOptions {
    /// Keywords kept per label.
    pub keyword_limit: usize,
    /// Posts kept in [`SentimentReport::top_posts`].
    pub top_n: usize,
    /// Label whose most-engaged posts are surfaced.
    pub top_label: SentimentLabel,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            keyword_limit: 5,
            top_n: 5,
            top_label: SentimentLabel::Negative,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordCount {
    pub word: String,
    pub count: usize,
}

/// Mean engagement over a label's posts. `defined` is `false` for an empty
/// label, in which case the means are zero and should not be shown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngagementSummary {
    pub defined: bool,
    pub mean_replies: f64,
    pub mean_likes: f64,
    pub mean_retweets: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelSummary {
    pub label: SentimentLabel,
    pub count: usize,
    /// Share of all posts, `0.0..=100.0`.
    pub percentage: f64,
    pub keywords: Vec<KeywordCount>,
    pub engagement: EngagementSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentReport {
    pub total: usize,
    /// Most frequent label; ties go to positive, then neutral, then
    /// negative. `None` when there are no posts.
    pub majority: Option<SentimentLabel>,
    /// One entry per label, in positive, neutral, negative order.
    pub labels: Vec<LabelSummary>,
    pub top_label: SentimentLabel,
    pub top_posts: Vec<ClassifiedPost>,
}

impl SentimentReport {
    #[must_use]
    pub fn summary(&self, label: SentimentLabel) -> Option<&LabelSummary> {
        self.labels.iter().find(|s| s.label == label)
    }

    #[must_use]
    pub fn count(&self, label: SentimentLabel) -> usize {
        self.summary(label).map_or(0, |s| s.count)
    }
}

/// Builds the report for `posts`. The input is only read.
#[must_use]
pub fn aggregate(posts: &[ClassifiedPost], options: &AggregateOptions) -> SentimentReport {
    let total = posts.len();

    let labels: Vec<LabelSummary> = SentimentLabel::PRIORITY
        .iter()
        .map(|&label| {
            let members: Vec<&ClassifiedPost> =
                posts.iter().filter(|p| p.label == label).collect();
            LabelSummary {
                label,
                count: members.len(),
                percentage: percentage(members.len(), total),
                keywords: keywords(&members, options.keyword_limit),
                engagement: engagement(&members),
            }
        })
        .collect();

    // Labels are in PRIORITY order; the incumbent wins ties.
    let majority = labels
        .iter()
        .filter(|s| s.count > 0)
        .fold(None::<&LabelSummary>, |best, s| match best {
            Some(b) if b.count >= s.count => Some(b),
            _ => Some(s),
        })
        .map(|s| s.label);

    SentimentReport {
        total,
        majority,
        labels,
        top_label: options.top_label,
        top_posts: top_posts(posts, options.top_label, options.top_n),
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

/// Most frequent non-stopword tokens of the normalized texts. Ties keep
/// first-seen order.
fn keywords(members: &[&ClassifiedPost], limit: usize) -> Vec<KeywordCount> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    let mut seen = 0usize;
    for post in members {
        for word in tokenize(&post.normalized_text) {
            if word.chars().count() < 2
                || word.chars().all(|c| c.is_ascii_digit())
                || is_stopword(word)
            {
                continue;
            }
            let entry = counts.entry(word).or_insert((0, seen));
            entry.0 += 1;
            seen += 1;
        }
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(word, (count, first))| (word, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked
        .into_iter()
        .take(limit)
        .map(|(word, count, _)| KeywordCount {
            word: word.to_string(),
            count,
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn engagement(members: &[&ClassifiedPost]) -> EngagementSummary {
    if members.is_empty() {
        return EngagementSummary {
            defined: false,
            mean_replies: 0.0,
            mean_likes: 0.0,
            mean_retweets: 0.0,
        };
    }
    let n = members.len() as f64;
    let mean = |f: fn(&ClassifiedPost) -> u64| members.iter().map(|p| f(p) as f64).sum::<f64>() / n;
    EngagementSummary {
        defined: true,
        mean_replies: mean(|p| p.post.reply_count),
        mean_likes: mean(|p| p.post.like_count),
        mean_retweets: mean(|p| p.post.retweet_count),
    }
}

/// Posts of `label` by replies, then likes (both descending), then earlier
/// timestamp; posts without a timestamp sort last.
fn top_posts(posts: &[ClassifiedPost], label: SentimentLabel, n: usize) -> Vec<ClassifiedPost> {
    let mut candidates: Vec<&ClassifiedPost> = posts.iter().filter(|p| p.label == label).collect();
    candidates.sort_by(|a, b| {
        b.post
            .reply_count
            .cmp(&a.post.reply_count)
            .then(b.post.like_count.cmp(&a.post.like_count))
            .then_with(|| match (a.post.created_at, b.post.created_at) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    });
    candidates.into_iter().take(n).cloned().collect()
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
