//! Keyword-dictionary sentiment scoring.
//!
//! Every score produced here is on a 0-100 scale. The raw valence in
//! [-1, 1] is exposed through [`valence`] for callers that need the signed
//! value; `sentiment = (valence + 1) / 2 * 100`.

use crate::models::analytics::SentimentScores;
use crate::models::chat::Mood;

/// Raw weighted sum is divided by this before clamping to [-1, 1].
const NORMALIZATION: f64 = 5.0;

/// Each indicator keyword found in the text adds this many points.
const INDICATOR_INCREMENT: f64 = 25.0;

const NEUTRAL_SENTIMENT: f64 = 50.0;

const POSITIVE_WORDS: &[(&str, f64)] = &[
    ("great", 0.8),
    ("good", 0.6),
    ("productive", 0.7),
    ("accomplished", 0.8),
    ("peaceful", 0.9),
    ("optimistic", 0.8),
    ("connected", 0.7),
    ("energetic", 0.7),
    ("progress", 0.6),
    ("ready", 0.5),
    ("happy", 0.7),
    ("calm", 0.6),
    ("grateful", 0.7),
    ("hopeful", 0.7),
    ("relaxed", 0.6),
    ("love", 0.7),
    ("wonderful", 0.8),
    ("excited", 0.7),
    ("proud", 0.7),
    ("better", 0.5),
];

const NEGATIVE_WORDS: &[(&str, f64)] = &[
    ("overwhelmed", -0.7),
    ("struggled", -0.6),
    ("anxiety", -0.7),
    ("stressed", -0.6),
    ("worried", -0.5),
    ("difficult", -0.5),
    ("tired", -0.4),
    ("frustrated", -0.6),
    ("confused", -0.4),
    ("uncertain", -0.4),
    ("sad", -0.7),
    ("bad", -0.6),
    ("terrible", -0.8),
    ("awful", -0.8),
    ("hopeless", -0.9),
    ("lonely", -0.7),
    ("depressed", -0.8),
    ("miserable", -0.8),
    ("angry", -0.6),
    ("scared", -0.6),
];

const MODIFIERS: &[(&str, f64)] = &[
    ("very", 1.5),
    ("really", 1.5),
    ("extremely", 2.0),
    ("somewhat", 0.5),
    ("bit", 0.3),
    ("slightly", 0.3),
];

// "stressed" appears in both the anxiety and stress lists of the journal
// scorer; it is counted as stress only so that the lists stay disjoint.
const ANXIETY_WORDS: &[&str] = &[
    "anxiety", "anxious", "worried", "worry", "nervous", "panic", "fear", "scared", "overwhelmed",
];

const DEPRESSION_WORDS: &[&str] = &[
    "sad", "hopeless", "tired", "unmotivated", "depressed", "lonely", "miserable", "empty", "worthless",
];

const STRESS_WORDS: &[&str] = &[
    "stressed", "stress", "pressure", "tension", "difficult", "exhausted", "burden", "strain",
];

/// Word lists for the chat mood tag. Kept apart from the valence tables:
/// an apology ("sorry") reads as a sad reply even though it carries no
/// journal weight.
const MOOD_POSITIVE_WORDS: &[&str] = &["happy", "great", "awesome", "excellent", "good", "love", "wonderful"];

const MOOD_NEGATIVE_WORDS: &[&str] = &["sad", "bad", "terrible", "awful", "hate", "unfortunate", "sorry"];

fn lookup(table: &[(&str, f64)], word: &str) -> Option<f64> {
    table.iter().find(|(w, _)| *w == word).map(|(_, weight)| *weight)
}

/// Whitespace tokens, lower-cased, with surrounding punctuation removed.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|raw| {
            raw.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|token| !token.is_empty())
        .collect()
}

/// Signed valence in [-1, 1].
///
/// A modifier word scales the next dictionary hit only, then the multiplier
/// resets to 1. Words in neither table leave a pending modifier in place.
pub fn valence(text: &str) -> f64 {
    let mut total = 0.0;
    let mut multiplier = 1.0;

    for token in tokenize(text) {
        if let Some(m) = lookup(MODIFIERS, &token) {
            multiplier = m;
            continue;
        }

        if let Some(weight) = lookup(POSITIVE_WORDS, &token).or_else(|| lookup(NEGATIVE_WORDS, &token)) {
            total += weight * multiplier;
            multiplier = 1.0;
        }
    }

    (total / NORMALIZATION).clamp(-1.0, 1.0)
}

fn indicator_score(tokens: &[String], keywords: &[&str]) -> f64 {
    let present = keywords
        .iter()
        .filter(|keyword| tokens.iter().any(|t| t == *keyword))
        .count();
    (present as f64 * INDICATOR_INCREMENT).clamp(0.0, 100.0)
}

pub fn score(text: &str) -> SentimentScores {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return SentimentScores {
            sentiment: NEUTRAL_SENTIMENT,
            anxiety: 0.0,
            depression: 0.0,
            stress: 0.0,
        };
    }

    SentimentScores {
        sentiment: (valence(text) + 1.0) / 2.0 * 100.0,
        anxiety: indicator_score(&tokens, ANXIETY_WORDS),
        depression: indicator_score(&tokens, DEPRESSION_WORDS),
        stress: indicator_score(&tokens, STRESS_WORDS),
    }
}

/// Coarse mood tag used to decorate chat messages.
pub fn mood(text: &str) -> Mood {
    let (positive, negative) = tokenize(text).iter().fold((0usize, 0usize), |(p, n), token| {
        if MOOD_POSITIVE_WORDS.contains(&token.as_str()) {
            (p + 1, n)
        } else if MOOD_NEGATIVE_WORDS.contains(&token.as_str()) {
            (p, n + 1)
        } else {
            (p, n)
        }
    });

    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Mood::Happy,
        std::cmp::Ordering::Less => Mood::Sad,
        std::cmp::Ordering::Equal => Mood::Neutral,
    }
}
