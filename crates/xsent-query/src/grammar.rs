//! Model of the search grammar: `field:value` operators, exact phrases,
//! hashtags, mentions, exclusions and plain keywords.

use std::fmt;

use chrono::NaiveDate;
use xsent_core::TimeWindow;

/// Weight of one filter relative to one plain keyword when ranking specificity.
const FILTER_WEIGHT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    From,
    To,
    Since,
    Until,
    Lang,
    MinReplies,
    MinFaves,
    MinRetweets,
    Filter,
}

impl Field {
    fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "from" => Some(Field::From),
            "to" => Some(Field::To),
            "since" => Some(Field::Since),
            "until" => Some(Field::Until),
            "lang" => Some(Field::Lang),
            "min_replies" => Some(Field::MinReplies),
            "min_faves" => Some(Field::MinFaves),
            "min_retweets" => Some(Field::MinRetweets),
            "filter" => Some(Field::Filter),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Field::From => "from",
            Field::To => "to",
            Field::Since => "since",
            Field::Until => "until",
            Field::Lang => "lang",
            Field::MinReplies => "min_replies",
            Field::MinFaves => "min_faves",
            Field::MinRetweets => "min_retweets",
            Field::Filter => "filter",
        }
    }

    fn is_date(self) -> bool {
        matches!(self, Field::Since | Field::Until)
    }

    fn is_author(self) -> bool {
        matches!(self, Field::From | Field::To)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Operator { field: Field, value: String },
    /// Exact-match clause, stored without its quotes.
    Phrase(String),
    /// Stored with the leading `#`.
    Hashtag(String),
    /// Stored with the leading `@`.
    Mention(String),
    /// Negated token, stored without the leading `-`.
    Exclude(String),
    Or,
    Word(String),
}

impl Term {
    fn classify(token: &str) -> Term {
        if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
            return Term::Phrase(token[1..token.len() - 1].to_string());
        }
        if token == "OR" {
            return Term::Or;
        }
        if let Some(rest) = token.strip_prefix('-').filter(|r| !r.is_empty()) {
            return Term::Exclude(rest.to_string());
        }
        if token.len() > 1 && token.starts_with('#') {
            return Term::Hashtag(token.to_string());
        }
        if token.len() > 1 && token.starts_with('@') {
            return Term::Mention(token.to_string());
        }
        if let Some((name, value)) = token.split_once(':') {
            if let Some(field) = Field::parse(name).filter(|_| !value.is_empty()) {
                return Term::Operator {
                    field,
                    value: value.to_string(),
                };
            }
        }
        Term::Word(token.to_string())
    }

    fn is_filter(&self) -> bool {
        !matches!(self, Term::Or | Term::Word(_))
    }

    fn keyword_count(&self) -> u32 {
        match self {
            Term::Word(_) => 1,
            Term::Phrase(p) => u32::try_from(p.split_whitespace().count()).unwrap_or(u32::MAX),
            _ => 0,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Operator { field, value } => write!(f, "{}:{value}", field.as_str()),
            Term::Phrase(p) => write!(f, "\"{p}\""),
            Term::Hashtag(s) | Term::Mention(s) | Term::Word(s) => f.write_str(s),
            Term::Exclude(s) => write!(f, "-{s}"),
            Term::Or => f.write_str("OR"),
        }
    }
}

/// A parsed search query. Parsing never fails; anything unrecognised is a keyword.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    terms: Vec<Term>,
}

impl Query {
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let terms = tokenize(text).iter().map(|t| Term::classify(t)).collect();
        Self { terms }
    }

    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Number of restricting clauses: operators, phrases, hashtags, mentions, exclusions.
    #[must_use]
    pub fn filter_count(&self) -> u32 {
        let n = self.terms.iter().filter(|t| t.is_filter()).count();
        u32::try_from(n).unwrap_or(u32::MAX)
    }

    /// Restrictiveness score. Every filter outweighs any realistic number of keywords.
    #[must_use]
    pub fn specificity(&self) -> u32 {
        let keywords: u32 = self.terms.iter().map(Term::keyword_count).sum();
        self.filter_count()
            .saturating_mul(FILTER_WEIGHT)
            .saturating_add(keywords)
    }

    #[must_use]
    pub fn has_date_bound(&self) -> bool {
        self.terms
            .iter()
            .any(|t| matches!(t, Term::Operator { field, .. } if field.is_date()))
    }

    /// Days between `since:` and `until:` when both are present and well-formed.
    #[must_use]
    pub fn date_span_days(&self) -> Option<i64> {
        let since = self.date_value(Field::Since)?;
        let until = self.date_value(Field::Until)?;
        Some((until - since).num_days())
    }

    /// Whether the query names something to search for, as opposed to only
    /// narrowing by date, language or engagement.
    #[must_use]
    pub fn has_search_term(&self) -> bool {
        self.terms.iter().any(|t| match t {
            Term::Word(_) | Term::Phrase(_) | Term::Hashtag(_) | Term::Mention(_) => true,
            Term::Operator { field, .. } => field.is_author(),
            Term::Exclude(_) | Term::Or => false,
        })
    }

    #[must_use]
    pub fn without_dates(&self) -> Self {
        self.retain(|t| !matches!(t, Term::Operator { field, .. } if field.is_date()))
    }

    /// Replaces every exact-match clause with its bare words.
    #[must_use]
    pub fn without_phrases(&self) -> Self {
        let terms = self
            .terms
            .iter()
            .flat_map(|t| match t {
                Term::Phrase(p) => p
                    .split_whitespace()
                    .map(|w| Term::Word(w.to_string()))
                    .collect::<Vec<_>>(),
                other => vec![other.clone()],
            })
            .collect();
        Self { terms }
    }

    #[must_use]
    pub fn without_authors(&self) -> Self {
        self.retain(|t| match t {
            Term::Operator { field, .. } => !field.is_author(),
            Term::Mention(_) => false,
            _ => true,
        })
    }

    #[must_use]
    pub fn without_lang(&self) -> Self {
        self.retain(|t| !matches!(t, Term::Operator { field: Field::Lang, .. }))
    }

    /// Appends the window's bounds as `since:`/`until:` operators.
    #[must_use]
    pub fn with_window(&self, window: &TimeWindow) -> Self {
        let mut terms = self.terms.clone();
        if let Some(since) = window.since() {
            terms.push(Term::Operator {
                field: Field::Since,
                value: since.format("%Y-%m-%d").to_string(),
            });
        }
        if let Some(until) = window.until() {
            terms.push(Term::Operator {
                field: Field::Until,
                value: until.format("%Y-%m-%d").to_string(),
            });
        }
        Self { terms }
    }

    fn date_value(&self, wanted: Field) -> Option<NaiveDate> {
        self.terms.iter().find_map(|t| match t {
            Term::Operator { field, value } if *field == wanted => {
                NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
            }
            _ => None,
        })
    }

    fn retain(&self, keep: impl Fn(&Term) -> bool) -> Self {
        let kept: Vec<Term> = self.terms.iter().filter(|t| keep(t)).cloned().collect();
        Self { terms: tidy_or(kept) }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for term in &self.terms {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{term}")?;
            first = false;
        }
        Ok(())
    }
}

/// Whether `text` already uses the search grammar: any recognised
/// `field:value` operator or hashtag.
#[must_use]
pub fn looks_like_grammar(text: &str) -> bool {
    Query::parse(text)
        .terms
        .iter()
        .any(|t| matches!(t, Term::Operator { .. } | Term::Hashtag(_)))
}

/// Splits on whitespace outside double quotes.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in text.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
            current.push(c);
        } else if c.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Drops `OR` connectives left dangling after terms were removed.
fn tidy_or(terms: Vec<Term>) -> Vec<Term> {
    let mut out: Vec<Term> = Vec::with_capacity(terms.len());
    for term in terms {
        if term == Term::Or && matches!(out.last(), None | Some(Term::Or)) {
            continue;
        }
        out.push(term);
    }
    while out.last() == Some(&Term::Or) {
        out.pop();
    }
    out
}
