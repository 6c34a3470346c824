//! Deterministic term and theme extraction over response texts.
//!
//! Everything here is a pure function of the input set: identical response
//! snapshots always yield identical themes, which keeps aggregation
//! reproducible without consulting any language model.

use std::collections::{BTreeMap, BTreeSet};

const STOP_WORDS: &[&str] = &[
    "about", "all", "also", "and", "any", "are", "been", "but", "can", "could", "does", "dont",
    "for", "from", "get", "has", "have", "how", "its", "ive", "just", "like", "look", "looks",
    "more", "much", "not", "one", "our", "out", "really", "see", "some", "than", "that", "the",
    "them", "there", "these", "they", "thing", "things", "this", "those", "too", "very", "was",
    "were", "what", "when", "will", "with", "would", "you", "your",
];

/// Lowercased alphanumeric tokens of length >= 3, stop words removed.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| token.len() >= 3 && !STOP_WORDS.contains(token))
        .map(|token| token.to_string())
        .collect()
}

/// Document frequency: for each distinct term, the number of texts that
/// mention it at least once.
pub fn term_frequencies<'a, I>(texts: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut frequencies = BTreeMap::new();
    for text in texts {
        let distinct: BTreeSet<String> = tokenize(text).into_iter().collect();
        for term in distinct {
            *frequencies.entry(term).or_insert(0) += 1;
        }
    }
    frequencies
}

/// Terms ranked by frequency (descending) then alphabetically, truncated to
/// `limit`. The alphabetical tie-break keeps the ranking stable across runs.
pub fn top_terms(frequencies: &BTreeMap<String, usize>, limit: usize) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = frequencies
        .iter()
        .map(|(term, count)| (term.clone(), *count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

/// Cross-segment key themes: terms mentioned by at least two responses,
/// ranked by how many responses mention them.
pub fn key_themes(texts: &[&str], limit: usize) -> Vec<String> {
    let frequencies = term_frequencies(texts.iter().copied());
    top_terms(&frequencies, frequencies.len())
        .into_iter()
        .filter(|(_, count)| *count >= 2)
        .take(limit)
        .map(|(term, _)| term)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_strips_stop_words_and_short_tokens() {
        let tokens = tokenize("The filter is great, and the bottle is BPA-free!");
        assert!(tokens.contains(&"filter".to_string()));
        assert!(tokens.contains(&"bottle".to_string()));
        assert!(!tokens.contains(&"the".to_string()));
        assert!(!tokens.contains(&"is".to_string()));
    }

    #[test]
    fn term_frequencies_count_documents_not_occurrences() {
        let frequencies =
            term_frequencies(["filter filter filter", "filter bottle"].into_iter());
        assert_eq!(frequencies.get("filter"), Some(&2));
        assert_eq!(frequencies.get("bottle"), Some(&1));
    }

    #[test]
    fn key_themes_require_recurrence() {
        let texts = [
            "The filter sounds useful for travel",
            "A filter would save money on bottled water",
            "Nice color options",
        ];
        let themes = key_themes(&texts, 5);
        assert!(themes.contains(&"filter".to_string()));
        assert!(!themes.contains(&"color".to_string()));
    }

    #[test]
    fn key_themes_are_deterministic() {
        let texts = [
            "price price filter",
            "filter price",
            "filter bottle price",
        ];
        assert_eq!(key_themes(&texts, 3), key_themes(&texts, 3));
        // Equal frequencies fall back to alphabetical order; "bottle" appears
        // in only one response and is dropped.
        assert_eq!(key_themes(&texts, 3), vec!["filter", "price"]);
    }
}
