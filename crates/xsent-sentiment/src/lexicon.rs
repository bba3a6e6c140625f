//! Valence lexicon scorer.
//!
//! Word valences follow the usual `[-4, 4]` social-media lexicon scale.
//! Per-word valences are summed (with boosters and negation applied) and
//! squashed into `[-1, 1]` as `s / sqrt(s² + 15)`.

use std::collections::HashMap;
use std::sync::LazyLock;

use xsent_core::SentimentLabel;

/// Default `|score|` below which a text is neutral.
pub const DEFAULT_THRESHOLD: f32 = 0.05;

/// Word valences. Keys are lowercase single words, English and Indonesian.
pub(crate) const LEXICON: &[(&str, f32)] = &[
    // English, positive
    ("good", 1.9),
    ("great", 3.1),
    ("excellent", 2.7),
    ("amazing", 2.8),
    ("wonderful", 2.7),
    ("love", 3.2),
    ("loved", 2.9),
    ("like", 1.5),
    ("happy", 2.7),
    ("glad", 2.0),
    ("best", 3.2),
    ("better", 1.9),
    ("nice", 1.8),
    ("cool", 1.3),
    ("beautiful", 2.9),
    ("delicious", 2.7),
    ("fun", 2.3),
    ("funny", 1.9),
    ("laugh", 2.6),
    ("laughing", 2.2),
    ("satisfying", 2.0),
    ("satisfied", 1.8),
    ("recommend", 1.5),
    ("helpful", 1.7),
    ("easy", 1.9),
    ("safe", 1.9),
    ("proud", 2.1),
    ("hope", 1.9),
    ("thanks", 1.9),
    ("thank", 1.5),
    ("agree", 1.5),
    ("success", 2.7),
    ("successful", 2.8),
    ("win", 2.8),
    ("improve", 1.9),
    ("improved", 2.1),
    ("support", 1.7),
    ("awesome", 3.1),
    ("perfect", 2.7),
    ("friendly", 2.2),
    ("relaxed", 1.6),
    // English, negative
    ("bad", -2.5),
    ("terrible", -2.1),
    ("awful", -2.0),
    ("horrible", -2.5),
    ("hate", -2.7),
    ("hated", -3.2),
    ("worst", -3.1),
    ("worse", -2.1),
    ("poor", -2.1),
    ("sad", -2.1),
    ("angry", -2.3),
    ("annoying", -1.9),
    ("annoyed", -1.6),
    ("disappointing", -2.2),
    ("disappointed", -1.9),
    ("upset", -1.6),
    ("afraid", -2.2),
    ("scared", -1.9),
    ("problem", -1.7),
    ("problems", -1.7),
    ("fail", -2.5),
    ("failed", -2.3),
    ("failure", -2.3),
    ("wrong", -2.1),
    ("broken", -1.8),
    ("useless", -1.8),
    ("stupid", -2.4),
    ("difficult", -1.5),
    ("expensive", -1.0),
    ("slow", -0.8),
    ("tired", -1.1),
    ("damage", -2.2),
    ("dangerous", -2.1),
    ("crisis", -3.1),
    ("chaos", -2.7),
    ("corruption", -2.8),
    ("corrupt", -2.4),
    ("fraud", -2.8),
    ("scam", -2.9),
    ("lie", -1.8),
    ("lies", -1.8),
    ("complain", -1.5),
    ("loss", -1.3),
    // Indonesian, positive
    ("bagus", 1.9),
    ("baik", 1.9),
    ("mantap", 2.5),
    ("keren", 2.2),
    ("hebat", 2.7),
    ("senang", 2.7),
    ("suka", 2.0),
    ("cinta", 3.2),
    ("memuaskan", 2.0),
    ("puas", 1.8),
    ("indah", 2.5),
    ("lucu", 1.9),
    ("enak", 2.0),
    ("sukses", 2.7),
    ("berhasil", 2.5),
    ("setuju", 1.5),
    ("bangga", 2.1),
    ("aman", 1.9),
    ("mudah", 1.9),
    ("cepat", 1.0),
    ("ramah", 2.0),
    ("membantu", 1.7),
    ("tertawa", 2.0),
    ("semangat", 2.0),
    ("juara", 2.5),
    ("menang", 2.8),
    ("terimakasih", 1.9),
    ("santai", 1.2),
    // Indonesian, negative
    ("buruk", -2.5),
    ("jelek", -2.1),
    ("jahat", -2.7),
    ("benci", -2.7),
    ("kecewa", -2.0),
    ("mengecewakan", -2.2),
    ("marah", -2.3),
    ("sedih", -2.1),
    ("parah", -2.3),
    ("payah", -2.0),
    ("gagal", -2.3),
    ("rusak", -1.8),
    ("lambat", -0.9),
    ("mahal", -1.0),
    ("susah", -1.5),
    ("sulit", -1.5),
    ("bohong", -1.8),
    ("korupsi", -2.8),
    ("penipuan", -2.9),
    ("tipu", -2.5),
    ("bodoh", -2.4),
    ("kacau", -2.7),
    ("bahaya", -2.1),
    ("takut", -2.2),
    ("kesal", -1.9),
    ("capek", -1.1),
    ("lelah", -1.1),
    ("masalah", -1.7),
    ("salah", -2.1),
    ("rugi", -2.0),
    ("krisis", -3.1),
];

/// Intensifiers that strengthen the following sentiment word.
const PRE_BOOSTERS: &[&str] = &[
    "very", "really", "extremely", "so", "totally", "sangat", "amat", "terlalu", "paling",
    "begitu",
];

/// Indonesian intensifiers that follow the word they strengthen.
const POST_BOOSTERS: &[&str] = &["banget", "sekali", "bgt"];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "cant", "dont", "doesnt", "didnt", "isnt", "wasnt", "wont", "aint",
    "nothing", "tidak", "bukan", "jangan", "belum", "tak", "tanpa",
];

const BOOST: f32 = 0.293;
const NEGATION_SCALAR: f32 = -0.74;
const NEGATION_WINDOW: usize = 3;
const BOOST_WINDOW: usize = 2;
const ALPHA: f32 = 15.0;

static VALENCES: LazyLock<HashMap<&'static str, f32>> =
    LazyLock::new(|| LEXICON.iter().copied().collect());

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|w| w.replace('\'', "").to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Normalized valence of `text` in `[-1.0, 1.0]`. Returns `0.0` when no
/// lexicon word occurs.
///
/// A negator within the three preceding tokens flips and damps a word's
/// valence; an intensifier just before (or, for Indonesian, just after)
/// the word pushes it further from zero.
#[must_use]
pub fn valence_score(text: &str) -> f32 {
    let words = tokens(text);
    let mut sum = 0.0_f32;

    for (i, word) in words.iter().enumerate() {
        let Some(&base) = VALENCES.get(word.as_str()) else {
            continue;
        };
        let mut valence = base;

        let boosters = words[i.saturating_sub(BOOST_WINDOW)..i]
            .iter()
            .filter(|w| PRE_BOOSTERS.contains(&w.as_str()))
            .count()
            + usize::from(
                words
                    .get(i + 1)
                    .is_some_and(|w| POST_BOOSTERS.contains(&w.as_str())),
            );
        #[allow(clippy::cast_precision_loss)]
        let boost = BOOST * boosters as f32;
        valence += boost.copysign(valence);

        let negated = words[i.saturating_sub(NEGATION_WINDOW)..i]
            .iter()
            .any(|w| NEGATORS.contains(&w.as_str()));
        if negated {
            valence *= NEGATION_SCALAR;
        }

        sum += valence;
    }

    (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0)
}

/// Maps a score onto a label: positive above `threshold`, negative below
/// `-threshold`, neutral otherwise (boundaries included).
#[must_use]
pub fn label_for(score: f32, threshold: f32) -> SentimentLabel {
    if score > threshold {
        SentimentLabel::Positive
    } else if score < -threshold {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(text: &str) -> SentimentLabel {
        label_for(valence_score(text), DEFAULT_THRESHOLD)
    }

    #[test]
    fn empty_string_returns_zero() {
        assert_eq!(valence_score(""), 0.0);
    }

    #[test]
    fn unknown_words_return_zero() {
        assert_eq!(valence_score("update informasi terbaru"), 0.0);
        assert_eq!(label("update informasi terbaru"), SentimentLabel::Neutral);
    }

    #[test]
    fn english_sentences_classify() {
        assert_eq!(label("i love this amazing product"), SentimentLabel::Positive);
        assert_eq!(label("i hate this terrible product"), SentimentLabel::Negative);
        assert_eq!(label("great excellent wonderful"), SentimentLabel::Positive);
        assert_eq!(label("awful horrible terrible"), SentimentLabel::Negative);
    }

    #[test]
    fn indonesian_sentences_classify() {
        assert_eq!(label("sangat bagus dan memuaskan"), SentimentLabel::Positive);
        assert_eq!(
            label("sangat buruk dan mengecewakan"),
            SentimentLabel::Negative
        );
    }

    #[test]
    fn negation_flips_sign() {
        assert!(valence_score("good") > 0.0);
        assert!(valence_score("not good") < 0.0);
        assert!(valence_score("tidak bagus") < 0.0);
        assert!(valence_score("tidak terlalu bagus") < 0.0);
    }

    #[test]
    fn negator_outside_window_does_not_apply() {
        assert!(valence_score("tidak ada yang bilang ini bagus") > 0.0);
    }

    #[test]
    fn boosters_strengthen_in_both_positions() {
        let plain = valence_score("bagus");
        assert!(valence_score("sangat bagus") > plain);
        assert!(valence_score("bagus banget") > plain);
        assert!(valence_score("very bad") < valence_score("bad"));
    }

    #[test]
    fn apostrophes_and_punctuation_are_stripped() {
        assert!(valence_score("don't like it!!!") < 0.0);
        assert!(valence_score("GREAT!!!") > 0.0);
    }

    #[test]
    fn score_stays_in_range() {
        let text = "love ".repeat(200);
        let s = valence_score(&text);
        assert!(s > 0.99 && s <= 1.0);
        let s = valence_score(&"hate ".repeat(200));
        assert!((-1.0..-0.99).contains(&s));
    }

    #[test]
    fn threshold_boundaries() {
        assert_eq!(label_for(0.05, 0.05), SentimentLabel::Neutral);
        assert_eq!(label_for(-0.05, 0.05), SentimentLabel::Neutral);
        assert_eq!(label_for(0.051, 0.05), SentimentLabel::Positive);
        assert_eq!(label_for(-0.051, 0.05), SentimentLabel::Negative);
        assert_eq!(label_for(0.049, 0.05), SentimentLabel::Neutral);
        assert_eq!(label_for(-0.3, 0.5), SentimentLabel::Neutral);
    }

    #[test]
    fn zero_threshold_keeps_unscored_text_neutral() {
        let score = valence_score("update informasi terbaru");
        assert!(score.abs() < f32::EPSILON);
        assert_eq!(label_for(score, 0.0), SentimentLabel::Neutral);
        assert_eq!(label_for(0.01, 0.0), SentimentLabel::Positive);
        assert_eq!(label_for(-0.01, 0.0), SentimentLabel::Negative);
    }
}
