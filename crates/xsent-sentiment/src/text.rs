//! Text cleaning applied before slang normalization and keyword counting.

use std::sync::LazyLock;

use regex::Regex;

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?\S+|www\S+").expect("valid regex"));
static MENTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@\w+").expect("valid regex"));
static HASHTAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\w+").expect("valid regex"));
static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));

/// Lowercases and strips URLs, mentions, hashtags and punctuation, then
/// collapses whitespace.
#[must_use]
pub fn clean(text: &str) -> String {
    let lower = text.to_lowercase();
    let no_urls = URL.replace_all(&lower, " ");
    let no_mentions = MENTION.replace_all(&no_urls, " ");
    let no_tags = HASHTAG.replace_all(&no_mentions, " ");
    let no_punct = PUNCTUATION.replace_all(&no_tags, "");
    no_punct.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits cleaned text into word tokens.
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}
