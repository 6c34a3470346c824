//! Keyword-based sentiment classification.
//!
//! `classify` is a pure function of the input text, so re-running aggregation
//! over the same stored responses is reproducible.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Per-response sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        })
    }
}

const POSITIVE_CUES: &[&str] = &[
    "love",
    "great",
    "amazing",
    "fantastic",
    "excellent",
    "perfect",
    "definitely",
    "would buy",
    "i'd buy",
    "sign me up",
    "excited",
    "awesome",
    "wonderful",
    "brilliant",
    "yes",
    "absolutely",
    "interested",
    "want",
    "need this",
    "can't wait",
    "impressive",
];

const NEGATIVE_CUES: &[&str] = &[
    "don't like",
    "wouldn't",
    "not interested",
    "dislike",
    "hate",
    "terrible",
    "awful",
    "no way",
    "pass",
    "skip",
    "not for me",
    "waste",
    "disappointed",
    "overpriced",
    "cheap",
    "wouldn't buy",
    "don't need",
    "not worth",
    "ugly",
    "boring",
];

/// Label a response text by counting positive and negative cue phrases,
/// case-insensitively. Ties (including zero hits) are neutral.
pub fn classify(text: &str) -> Sentiment {
    let lower = text.to_lowercase();
    let positive = POSITIVE_CUES.iter().filter(|cue| lower.contains(*cue)).count();
    let negative = NEGATIVE_CUES.iter().filter(|cue| lower.contains(*cue)).count();

    if positive > negative {
        Sentiment::Positive
    } else if negative > positive {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}
