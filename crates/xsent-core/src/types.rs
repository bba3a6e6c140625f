use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Closed sentiment label set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// All labels in majority tie-break priority order: positive, neutral, negative.
    pub const PRIORITY: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Neutral,
        SentimentLabel::Negative,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(SentimentLabel::Positive),
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            other => Err(CoreError::InvalidLabel(other.to_string())),
        }
    }
}

/// Inclusive date bounds for a search. Either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    since: Option<NaiveDate>,
    until: Option<NaiveDate>,
}

impl TimeWindow {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTimeWindow`] when `since` is after `until`.
    pub fn new(since: Option<NaiveDate>, until: Option<NaiveDate>) -> Result<Self, CoreError> {
        if let (Some(s), Some(u)) = (since, until) {
            if s > u {
                return Err(CoreError::InvalidTimeWindow { since: s, until: u });
            }
        }
        Ok(Self { since, until })
    }

    #[must_use]
    pub fn since(&self) -> Option<NaiveDate> {
        self.since
    }

    #[must_use]
    pub fn until(&self) -> Option<NaiveDate> {
        self.until
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.since.is_none() && self.until.is_none()
    }

    /// Renders the window as search operators, e.g. `since:2024-01-01 until:2024-01-31`.
    #[must_use]
    pub fn to_operators(&self) -> String {
        let mut parts = Vec::with_capacity(2);
        if let Some(s) = self.since {
            parts.push(format!("since:{}", s.format("%Y-%m-%d")));
        }
        if let Some(u) = self.until {
            parts.push(format!("until:{}", u.format("%Y-%m-%d")));
        }
        parts.join(" ")
    }
}

/// A caller's analysis request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Request {
    text: String,
    window: Option<TimeWindow>,
    limit: Option<u32>,
}

impl Request {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            window: None,
            limit: None,
        }
    }

    #[must_use]
    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = (!window.is_open()).then_some(window);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn window(&self) -> Option<&TimeWindow> {
        self.window.as_ref()
    }

    #[must_use]
    pub fn limit(&self) -> Option<u32> {
        self.limit
    }
}

/// Position of a query in the fallback ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyTag {
    Primary,
    /// 1-based fallback index.
    Fallback(u8),
}

impl StrategyTag {
    /// Tag for the strategy at `index` in the resolved sequence.
    #[must_use]
    pub fn for_index(index: usize) -> Self {
        if index == 0 {
            StrategyTag::Primary
        } else {
            StrategyTag::Fallback(u8::try_from(index).unwrap_or(u8::MAX))
        }
    }

    #[must_use]
    pub fn is_fallback(self) -> bool {
        matches!(self, StrategyTag::Fallback(_))
    }
}

impl fmt::Display for StrategyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyTag::Primary => f.write_str("primary"),
            StrategyTag::Fallback(n) => write!(f, "fallback-{n}"),
        }
    }
}

impl Serialize for StrategyTag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One search strategy: a grammar query, its ladder position and how restrictive it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedQuery {
    query: String,
    strategy: StrategyTag,
    specificity: u32,
}

impl ResolvedQuery {
    #[must_use]
    pub fn new(query: impl Into<String>, strategy: StrategyTag, specificity: u32) -> Self {
        Self {
            query: query.into(),
            strategy,
            specificity,
        }
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn strategy(&self) -> StrategyTag {
        self.strategy
    }

    #[must_use]
    pub fn specificity(&self) -> u32 {
        self.specificity
    }
}

/// A harvested post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub author: String,
    /// `None` when the harvester emitted an unparseable timestamp.
    pub created_at: Option<DateTime<Utc>>,
    pub text: String,
    pub reply_count: u64,
    pub like_count: u64,
    pub retweet_count: u64,
    pub lang: Option<String>,
}

impl Post {
    #[must_use]
    pub fn url(&self) -> String {
        format!("https://x.com/{}/status/{}", self.author, self.id)
    }
}

/// A post after normalization, translation and scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedPost {
    pub post: Post,
    pub normalized_text: String,
    pub pivot_text: String,
    /// `false` when translation failed and the normalized text was scored directly.
    pub translated: bool,
    pub label: SentimentLabel,
    /// Normalized valence score in `[-1.0, 1.0]`.
    pub score: f32,
    /// `|score|` relative to the largest magnitude in the batch, in `[0.0, 1.0]`.
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn label_priority_is_positive_neutral_negative() {
        assert_eq!(
            SentimentLabel::PRIORITY,
            [
                SentimentLabel::Positive,
                SentimentLabel::Neutral,
                SentimentLabel::Negative
            ]
        );
    }

    #[test]
    fn label_parses_case_insensitively() {
        assert_eq!(
            "Negative".parse::<SentimentLabel>().unwrap(),
            SentimentLabel::Negative
        );
        assert!("angry".parse::<SentimentLabel>().is_err());
    }

    #[test]
    fn label_serializes_lowercase() {
        let json = serde_json::to_string(&SentimentLabel::Neutral).unwrap();
        assert_eq!(json, "\"neutral\"");
    }

    #[test]
    fn time_window_rejects_inverted_bounds() {
        let err = TimeWindow::new(Some(date("2024-02-01")), Some(date("2024-01-01"))).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTimeWindow { .. }));
    }

    #[test]
    fn time_window_renders_operators() {
        let w = TimeWindow::new(Some(date("2024-01-01")), Some(date("2024-01-31"))).unwrap();
        assert_eq!(w.to_operators(), "since:2024-01-01 until:2024-01-31");

        let open_end = TimeWindow::new(Some(date("2024-01-01")), None).unwrap();
        assert_eq!(open_end.to_operators(), "since:2024-01-01");
    }

    #[test]
    fn request_drops_open_window() {
        let req = Request::new("x").with_window(TimeWindow::new(None, None).unwrap());
        assert!(req.window().is_none());
    }

    #[test]
    fn strategy_tag_display_and_index() {
        assert_eq!(StrategyTag::for_index(0).to_string(), "primary");
        assert_eq!(StrategyTag::for_index(2).to_string(), "fallback-2");
        assert!(StrategyTag::for_index(1).is_fallback());
        assert!(!StrategyTag::Primary.is_fallback());
    }

    #[test]
    fn strategy_tag_serializes_as_string() {
        let json = serde_json::to_string(&StrategyTag::Fallback(1)).unwrap();
        assert_eq!(json, "\"fallback-1\"");
    }

    #[test]
    fn post_url_uses_author_and_id() {
        let post = Post {
            id: "42".to_string(),
            author: "someone".to_string(),
            created_at: None,
            text: "hi".to_string(),
            reply_count: 0,
            like_count: 0,
            retweet_count: 0,
            lang: None,
        };
        assert_eq!(post.url(), "https://x.com/someone/status/42");
    }
}
