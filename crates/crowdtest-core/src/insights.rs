//! Panel-wide insight generation: sentiment breakdown, key themes, and the
//! executive summary.

use serde::{Deserialize, Serialize};

use crate::segmentation::{self, SegmentData};
use crate::sentiment::Sentiment;
use crate::session::AgentResponse;
use crate::themes;

/// Upper bound on cross-segment key themes in a report.
pub const KEY_THEME_LIMIT: usize = 5;

/// Counts and percentages over all collected responses.
///
/// Recomputed fully from the response snapshot on every aggregation pass;
/// the three counts always sum to the number of collected responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    #[serde(default)]
    pub positive: usize,
    #[serde(default)]
    pub neutral: usize,
    #[serde(default)]
    pub negative: usize,
    #[serde(default)]
    pub positive_pct: f64,
    #[serde(default)]
    pub neutral_pct: f64,
    #[serde(default)]
    pub negative_pct: f64,
}

impl SentimentBreakdown {
    /// Tally the snapshot; percentages are over collected responses (not
    /// dispatched profiles), rounded to one decimal.
    pub fn from_responses(responses: &[AgentResponse]) -> Self {
        let total = responses.len();
        let positive = count(responses, Sentiment::Positive);
        let negative = count(responses, Sentiment::Negative);
        let neutral = count(responses, Sentiment::Neutral);
        Self {
            positive,
            neutral,
            negative,
            positive_pct: pct(positive, total),
            neutral_pct: pct(neutral, total),
            negative_pct: pct(negative, total),
        }
    }
}

fn count(responses: &[AgentResponse], sentiment: Sentiment) -> usize {
    responses.iter().filter(|r| r.sentiment == sentiment).count()
}

fn pct(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 * 1000.0 / total as f64).round() / 10.0
}

/// The single aggregate output of a completed session. Immutable after
/// publication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightResults {
    #[serde(default)]
    pub executive_summary: String,
    #[serde(default)]
    pub sentiment_breakdown: SentimentBreakdown,
    #[serde(default)]
    pub segments: Vec<SegmentData>,
    #[serde(default)]
    pub key_themes: Vec<String>,
    /// Profiles dispatched, not just successes.
    #[serde(default)]
    pub total_agents: usize,
    /// Successes divided by `total_agents`, always within [0, 1].
    #[serde(default)]
    pub response_rate: f64,
}

/// Build the full report for a settled run.
///
/// Pure and deterministic: identical response snapshots yield byte-identical
/// results. An empty snapshot produces an all-zero report; the manager's
/// fatal no-responses path normally prevents that from ever publishing.
pub fn build_insights(responses: &[AgentResponse], total_agents: usize) -> InsightResults {
    let sentiment_breakdown = SentimentBreakdown::from_responses(responses);
    let segments = segmentation::build_segments(responses);
    let texts: Vec<&str> = responses.iter().map(|r| r.response_text.as_str()).collect();
    let key_themes = themes::key_themes(&texts, KEY_THEME_LIMIT);
    let response_rate = if total_agents == 0 {
        0.0
    } else {
        responses.len() as f64 / total_agents as f64
    };
    let executive_summary =
        executive_summary(responses, &sentiment_breakdown, &key_themes, total_agents);

    InsightResults {
        executive_summary,
        sentiment_breakdown,
        segments,
        key_themes,
        total_agents,
        response_rate,
    }
}

fn executive_summary(
    responses: &[AgentResponse],
    breakdown: &SentimentBreakdown,
    key_themes: &[String],
    total_agents: usize,
) -> String {
    if responses.is_empty() {
        return "No agent responses were collected for this run.".to_string();
    }

    let dominant = dominant_label(breakdown);
    let mut summary = format!(
        "Overall reaction was {dominant} ({:.1}% positive) across {} of {total_agents} simulated customers.",
        breakdown.positive_pct,
        responses.len(),
    );

    match ranked_segments(responses).as_slice() {
        [] => {}
        [only] => {
            summary.push_str(&format!(" All responses came from the {only} segment."));
        }
        [best, .., worst] => {
            summary.push_str(&format!(
                " Strongest reception came from the {best} segment, while {worst} responded least favorably."
            ));
        }
    }

    if let Some(theme) = key_themes.first() {
        summary.push_str(&format!(" The most salient theme was \"{theme}\"."));
    }
    summary
}

fn dominant_label(breakdown: &SentimentBreakdown) -> &'static str {
    if breakdown.positive >= breakdown.neutral && breakdown.positive >= breakdown.negative {
        "positive"
    } else if breakdown.negative > breakdown.positive && breakdown.negative >= breakdown.neutral {
        "negative"
    } else {
        "neutral"
    }
}

/// Segment labels ordered best to worst by net positive share, ties broken by
/// label so the ranking is stable.
fn ranked_segments(responses: &[AgentResponse]) -> Vec<String> {
    use std::collections::BTreeMap;

    let mut tallies: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
    for response in responses {
        let entry = tallies.entry(response.segment.as_str()).or_insert((0, 0));
        entry.1 += 1;
        match response.sentiment {
            Sentiment::Positive => entry.0 += 1,
            Sentiment::Negative => entry.0 -= 1,
            Sentiment::Neutral => {}
        }
    }

    let mut ranked: Vec<(&str, i64, i64)> = tallies
        .into_iter()
        .map(|(name, (net, count))| (name, net, count))
        .collect();
    // Compare net/count ratios by cross-multiplication to stay in integers.
    ranked.sort_by(|a, b| (b.1 * a.2).cmp(&(a.1 * b.2)).then_with(|| a.0.cmp(b.0)));
    ranked.into_iter().map(|(name, _, _)| name.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment;

    fn response(segment: &str, text: &str) -> AgentResponse {
        AgentResponse {
            agent_id: format!("{segment}:{text}"),
            profile_name: "Test".into(),
            age: 28,
            segment: segment.into(),
            response_text: text.into(),
            sentiment: sentiment::classify(text),
            response_time_ms: 42.0,
        }
    }

    fn sample_responses() -> Vec<AgentResponse> {
        vec![
            response("eco", "Love it, the filter is exactly what I want."),
            response("eco", "Amazing filter, definitely buying."),
            response("trend", "Fantastic bottle, sign me up."),
            response("trend", "Absolutely great, I need this."),
            response("budget", "I could see it working for some people."),
            response("budget", "Depends on the price point, hard to say."),
            response("budget", "Seems overpriced, not for me."),
        ]
    }

    #[test]
    fn breakdown_counts_sum_to_total_and_percentages_to_one_hundred() {
        let responses = sample_responses();
        let breakdown = SentimentBreakdown::from_responses(&responses);
        assert_eq!(
            breakdown.positive + breakdown.neutral + breakdown.negative,
            responses.len()
        );
        let pct_sum = breakdown.positive_pct + breakdown.neutral_pct + breakdown.negative_pct;
        assert!((pct_sum - 100.0).abs() <= 0.1, "pct sum was {pct_sum}");
    }

    #[test]
    fn seven_of_ten_scenario_produces_expected_breakdown() {
        let responses = sample_responses();
        let results = build_insights(&responses, 10);
        assert_eq!(results.total_agents, 10);
        assert!((results.response_rate - 0.7).abs() < 1e-9);
        assert_eq!(results.sentiment_breakdown.positive, 4);
        assert_eq!(results.sentiment_breakdown.neutral, 2);
        assert_eq!(results.sentiment_breakdown.negative, 1);
        assert!((results.sentiment_breakdown.positive_pct - 57.1).abs() < 1e-9);
        assert!((results.sentiment_breakdown.neutral_pct - 28.6).abs() < 1e-9);
        assert!((results.sentiment_breakdown.negative_pct - 14.3).abs() < 1e-9);
    }

    #[test]
    fn aggregation_is_idempotent_over_a_fixed_snapshot() {
        let responses = sample_responses();
        let first = serde_json::to_string(&build_insights(&responses, 10)).unwrap();
        let second = serde_json::to_string(&build_insights(&responses, 10)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_snapshot_is_all_zero() {
        let results = build_insights(&[], 0);
        assert_eq!(results.sentiment_breakdown, SentimentBreakdown::default());
        assert_eq!(results.response_rate, 0.0);
        assert!(results.segments.is_empty());
        assert!(results.key_themes.is_empty());
    }

    #[test]
    fn executive_summary_names_best_and_worst_segments() {
        let responses = sample_responses();
        let results = build_insights(&responses, 10);
        assert!(results.executive_summary.contains("eco"));
        assert!(results.executive_summary.contains("budget"));
        assert!(results.executive_summary.contains("positive"));
    }

    #[test]
    fn key_themes_surface_recurring_terms() {
        let responses = sample_responses();
        let results = build_insights(&responses, 10);
        assert!(results.key_themes.contains(&"filter".to_string()));
    }
}
