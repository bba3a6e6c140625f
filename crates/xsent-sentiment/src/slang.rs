//! Indonesian slang normalization.
//!
//! Replacements are whole-word and case-insensitive. Chained entries
//! (`a -> b`, `b -> c`) are resolved when the normalizer is built, so
//! normalizing already-normalized text is a no-op.

use std::collections::{BTreeMap, HashMap, HashSet};

use regex::{Captures, Regex};

use crate::error::SentimentError;

/// Built-in informal-to-canonical entries.
const BUILTIN_SLANG: &[(&str, &str)] = &[
    ("wkwkwkkwkw", "tertawa"),
    ("wkwk", "tertawa"),
    ("wkwkwk", "tertawa"),
    ("elu", "kamu"),
    ("lu", "kamu"),
    ("lo", "kamu"),
    ("gw", "saya"),
    ("gue", "saya"),
    ("sy", "saya"),
    ("skrng", "sekarang"),
    ("skrg", "sekarang"),
    ("banyk", "banyak"),
    ("bgt", "banget"),
    ("bngt", "banget"),
    ("kalo", "kalau"),
    ("klo", "kalau"),
    ("yg", "yang"),
    ("mo", "mau"),
    ("brapa", "berapa"),
    ("ga", "tidak"),
    ("gak", "tidak"),
    ("gk", "tidak"),
    ("nggak", "tidak"),
    ("ngga", "tidak"),
    ("enggak", "tidak"),
    ("tdk", "tidak"),
    ("udah", "sudah"),
    ("udh", "sudah"),
    ("sdh", "sudah"),
    ("lg", "lagi"),
    ("blm", "belum"),
    ("bkn", "bukan"),
    ("aja", "saja"),
    ("aj", "saja"),
    ("dgn", "dengan"),
    ("utk", "untuk"),
    ("krn", "karena"),
    ("karna", "karena"),
    ("tp", "tapi"),
    ("jg", "juga"),
    ("sm", "sama"),
    ("dr", "dari"),
    ("bs", "bisa"),
    ("emg", "memang"),
    ("emang", "memang"),
    ("gimana", "bagaimana"),
    ("gmn", "bagaimana"),
    ("knp", "kenapa"),
    ("trs", "terus"),
    ("bener", "benar"),
    ("mantul", "mantap"),
    ("kuy", "yuk"),
    ("santuy", "santai"),
    ("gpp", "tidak apa apa"),
];

#[derive(Debug)]
pub struct SlangNormalizer {
    entries: HashMap<String, String>,
    pattern: Option<Regex>,
}

impl SlangNormalizer {
    /// Normalizer over the built-in dictionary only.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_entries(builtin_entries()).expect("built-in slang table compiles")
    }

    /// Built-in dictionary extended (and overridden) by `overrides`.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::SlangPattern`] if the merged dictionary
    /// cannot be compiled into a matcher.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Result<Self, SentimentError> {
        let merged = builtin_entries().chain(
            overrides
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        Self::from_entries(merged)
    }

    /// Builds a normalizer from arbitrary entries. Later entries win.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::SlangPattern`] if the entries cannot be
    /// compiled into a matcher.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, SentimentError> {
        let mut raw: HashMap<String, String> = HashMap::new();
        for (informal, canonical) in entries {
            let key = informal.trim().to_lowercase();
            let value = canonical.split_whitespace().collect::<Vec<_>>().join(" ");
            if key.is_empty() || value.is_empty() {
                continue;
            }
            raw.insert(key, value.to_lowercase());
        }

        let entries = resolve_chains(&raw);
        let pattern = if entries.is_empty() {
            None
        } else {
            let mut keys: Vec<&str> = entries.keys().map(String::as_str).collect();
            keys.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
            let alternation = keys
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!(r"(?i)\b(?:{alternation})\b"))?)
        };

        Ok(Self { entries, pattern })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replaces every known informal word in `text` with its canonical form.
    /// Unknown words and surrounding text are left untouched.
    #[must_use]
    pub fn normalize(&self, text: &str) -> String {
        let Some(pattern) = &self.pattern else {
            return text.to_string();
        };
        pattern
            .replace_all(text, |caps: &Captures<'_>| {
                let word = &caps[0];
                self.entries
                    .get(&word.to_lowercase())
                    .cloned()
                    .unwrap_or_else(|| word.to_string())
            })
            .into_owned()
    }
}

fn builtin_entries() -> impl Iterator<Item = (String, String)> {
    BUILTIN_SLANG
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
}

/// Rewrites every value so none of its words is itself a key. Keys that sit
/// on a cycle are dropped and left as plain words.
fn resolve_chains(raw: &HashMap<String, String>) -> HashMap<String, String> {
    let mut cyclic: HashSet<String> = HashSet::new();
    let mut resolved: HashMap<String, String> = HashMap::new();

    for key in raw.keys() {
        let mut stack = Vec::new();
        let words = expand(key, raw, &mut stack, &mut cyclic);
        resolved.insert(key.clone(), words.join(" "));
    }

    for key in &cyclic {
        tracing::warn!(slang = %key, "slang entry forms a cycle, ignoring it");
        resolved.remove(key);
    }
    resolved.retain(|key, value| value != key);
    resolved
}

fn expand(
    word: &str,
    raw: &HashMap<String, String>,
    stack: &mut Vec<String>,
    cyclic: &mut HashSet<String>,
) -> Vec<String> {
    if stack.iter().any(|w| w == word) {
        cyclic.insert(word.to_string());
        return vec![word.to_string()];
    }
    let Some(value) = raw.get(word) else {
        return vec![word.to_string()];
    };

    stack.push(word.to_string());
    let words = value
        .split_whitespace()
        .flat_map(|w| expand(w, raw, stack, cyclic))
        .collect();
    stack.pop();
    words
}
