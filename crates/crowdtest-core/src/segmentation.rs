//! Per-segment grouping, majority sentiment, and segment summaries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sentiment::Sentiment;
use crate::session::AgentResponse;
use crate::themes;

/// Upper bound on curated quotes per segment.
pub const MAX_KEY_QUOTES: usize = 3;

/// Majority reaction of a segment, distinct from per-response sentiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentSentiment {
    Positive,
    Mixed,
    Negative,
}

/// Derived view of one segment's reaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentData {
    pub segment_name: String,
    pub count: usize,
    pub sentiment: SegmentSentiment,
    pub summary: String,
    #[serde(default)]
    pub key_quotes: Vec<String>,
    #[serde(default)]
    pub recommendation: String,
}

/// Group responses by attributed segment and summarize each group.
///
/// Segments with zero responses are omitted. Output is ordered by descending
/// count, ties broken by segment label, so identical snapshots always produce
/// identical reports.
pub fn build_segments(responses: &[AgentResponse]) -> Vec<SegmentData> {
    let mut groups: BTreeMap<&str, Vec<&AgentResponse>> = BTreeMap::new();
    for response in responses {
        groups
            .entry(response.segment.as_str())
            .or_default()
            .push(response);
    }

    let mut segments: Vec<SegmentData> = groups
        .into_iter()
        .map(|(name, group)| summarize_group(name, &group))
        .collect();
    segments.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.segment_name.cmp(&b.segment_name))
    });
    segments
}

/// Strict-majority rule: positive (or negative) only when that count exceeds
/// the other two combined; everything else, including ties, is mixed.
fn majority_sentiment(group: &[&AgentResponse]) -> SegmentSentiment {
    let total = group.len();
    let positive = group
        .iter()
        .filter(|r| r.sentiment == Sentiment::Positive)
        .count();
    let negative = group
        .iter()
        .filter(|r| r.sentiment == Sentiment::Negative)
        .count();

    if positive > total - positive {
        SegmentSentiment::Positive
    } else if negative > total - negative {
        SegmentSentiment::Negative
    } else {
        SegmentSentiment::Mixed
    }
}

fn summarize_group(name: &str, group: &[&AgentResponse]) -> SegmentData {
    let sentiment = majority_sentiment(group);
    let reaction = match sentiment {
        SegmentSentiment::Positive => "largely favorable",
        SegmentSentiment::Negative => "largely unfavorable",
        SegmentSentiment::Mixed => "mixed",
    };

    let frequencies = themes::term_frequencies(group.iter().map(|r| r.response_text.as_str()));
    let topics: Vec<String> = themes::top_terms(&frequencies, 3)
        .into_iter()
        .map(|(term, _)| term)
        .collect();

    let mut summary = format!(
        "Reaction from the {name} segment was {reaction} across {} response(s).",
        group.len()
    );
    if !topics.is_empty() {
        summary.push_str(&format!(" Recurring topics: {}.", topics.join(", ")));
    }

    let recommendation = match sentiment {
        SegmentSentiment::Positive => {
            format!("Highlight this offer to the {name} segment in launch messaging.")
        }
        SegmentSentiment::Negative => {
            format!("Address the concerns raised by the {name} segment before a wider rollout.")
        }
        SegmentSentiment::Mixed => {
            format!("Refine the positioning and re-test with the {name} segment.")
        }
    };

    SegmentData {
        segment_name: name.to_string(),
        count: group.len(),
        sentiment,
        summary,
        key_quotes: select_quotes(group),
        recommendation,
    }
}

/// Curate up to [`MAX_KEY_QUOTES`] quotes, favoring sentiment diversity over
/// recency: the first positive, negative, and neutral response in arrival
/// order, then fill with remaining responses.
fn select_quotes(group: &[&AgentResponse]) -> Vec<String> {
    let mut quotes = Vec::new();
    for wanted in [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral] {
        if quotes.len() == MAX_KEY_QUOTES {
            break;
        }
        if let Some(response) = group.iter().find(|r| r.sentiment == wanted) {
            quotes.push(response.response_text.clone());
        }
    }
    for response in group {
        if quotes.len() == MAX_KEY_QUOTES {
            break;
        }
        if !quotes.contains(&response.response_text) {
            quotes.push(response.response_text.clone());
        }
    }
    quotes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment;

    fn response(segment: &str, text: &str) -> AgentResponse {
        AgentResponse {
            agent_id: format!("agent_{segment}_{}", text.len()),
            profile_name: "Test".into(),
            age: 30,
            segment: segment.into(),
            response_text: text.into(),
            sentiment: sentiment::classify(text),
            response_time_ms: 10.0,
        }
    }

    #[test]
    fn counts_match_group_sizes_and_order_is_by_descending_count() {
        let responses = vec![
            response("eco", "Love it, sign me up!"),
            response("budget", "Seems overpriced, not for me."),
            response("budget", "I could take it or leave it."),
            response("trend", "Absolutely amazing, I want one."),
            response("budget", "Not worth the money, pass."),
        ];
        let segments = build_segments(&responses);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].segment_name, "budget");
        assert_eq!(segments[0].count, 3);
        // Tied counts fall back to label order.
        assert_eq!(segments[1].segment_name, "eco");
        assert_eq!(segments[2].segment_name, "trend");
    }

    #[test]
    fn strict_majority_required_for_a_directional_label() {
        let positive = vec![
            response("s", "Love it!"),
            response("s", "Amazing, want one."),
            response("s", "Hmm, hard to say."),
        ];
        let groups: Vec<&AgentResponse> = positive.iter().collect();
        assert_eq!(majority_sentiment(&groups), SegmentSentiment::Positive);

        let split = vec![
            response("s", "Love it!"),
            response("s", "Terrible, no way."),
        ];
        let groups: Vec<&AgentResponse> = split.iter().collect();
        assert_eq!(majority_sentiment(&groups), SegmentSentiment::Mixed);
    }

    #[test]
    fn quotes_favor_sentiment_diversity() {
        let responses = vec![
            response("s", "Love it, amazing!"),
            response("s", "Also love it, fantastic!"),
            response("s", "Awful, hate it."),
            response("s", "Could go either way."),
        ];
        let segments = build_segments(&responses);
        let quotes = &segments[0].key_quotes;
        assert_eq!(quotes.len(), MAX_KEY_QUOTES);
        assert_eq!(quotes[0], "Love it, amazing!");
        assert_eq!(quotes[1], "Awful, hate it.");
        assert_eq!(quotes[2], "Could go either way.");
    }

    #[test]
    fn empty_input_yields_no_segments() {
        assert!(build_segments(&[]).is_empty());
    }

    #[test]
    fn recommendation_tracks_majority_sentiment() {
        let responses = vec![
            response("commuters", "Terrible idea, waste of money."),
            response("commuters", "Awful, I hate it."),
        ];
        let segments = build_segments(&responses);
        assert_eq!(segments[0].sentiment, SegmentSentiment::Negative);
        assert!(segments[0].recommendation.contains("Address the concerns"));
        assert!(segments[0].recommendation.contains("commuters"));
    }
}
