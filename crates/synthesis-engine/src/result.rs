use chrono::{DateTime, Utc};
use serde::Serialize;
use signal_core::{Category, Confidence, Sentiment, NEUTRAL_SCORE};
use std::collections::BTreeMap;

use crate::aggregator::CategoryScore;
use crate::collector::CollectedMetric;
use crate::conflicts::Conflict;
use crate::takeaways::{ActionItem, KeyTakeaway};

/// Combined assessment of one batch of signals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesisResult {
    pub subject: String,
    /// Latest `as_of` among the inputs
    pub as_of: Option<DateTime<Utc>>,
    pub signal_count: usize,
    pub overall_sentiment: Sentiment,
    /// 0-100
    pub overall_score: f64,
    /// Composite weighted mean before clamping (-100..=100)
    pub overall_raw_score: f64,
    pub overall_confidence: Confidence,
    pub recommendation: String,
    pub category_scores: BTreeMap<Category, CategoryScore>,
    /// Primary-tier metrics across all signals
    pub key_metrics: Vec<CollectedMetric>,
    pub key_takeaways: Vec<KeyTakeaway>,
    pub conflicts: Vec<Conflict>,
    pub action_items: Vec<ActionItem>,
}

impl SynthesisResult {
    /// Result for an empty batch: neutral defaults, nothing collected
    pub fn empty() -> Self {
        Self {
            subject: String::new(),
            as_of: None,
            signal_count: 0,
            overall_sentiment: Sentiment::Neutral,
            overall_score: NEUTRAL_SCORE,
            overall_raw_score: NEUTRAL_SCORE,
            overall_confidence: Confidence::Low,
            recommendation: recommendation(Sentiment::Neutral, Confidence::Low, false),
            category_scores: BTreeMap::new(),
            key_metrics: Vec::new(),
            key_takeaways: Vec::new(),
            conflicts: Vec::new(),
            action_items: Vec::new(),
        }
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Short human-readable stance for the presentation layer
pub fn recommendation(sentiment: Sentiment, confidence: Confidence, has_conflicts: bool) -> String {
    let stance = match sentiment {
        Sentiment::Bullish => "Bullish",
        Sentiment::Bearish => "Bearish",
        Sentiment::Neutral => "Neutral / Hold",
        Sentiment::Mixed => "Mixed signals",
    };

    let confidence_desc = match confidence {
        Confidence::High => "high",
        Confidence::Medium => "moderate",
        Confidence::Low => "low",
    };

    if has_conflicts {
        format!(
            "{} (confidence: {}, conflicting signals to review)",
            stance, confidence_desc
        )
    } else {
        format!("{} (confidence: {})", stance, confidence_desc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_labels() {
        assert_eq!(
            recommendation(Sentiment::Bullish, Confidence::High, false),
            "Bullish (confidence: high)"
        );
        assert_eq!(
            recommendation(Sentiment::Mixed, Confidence::Medium, true),
            "Mixed signals (confidence: moderate, conflicting signals to review)"
        );
    }

    #[test]
    fn test_empty_result() {
        let result = SynthesisResult::empty();
        assert_eq!(result.overall_score, 50.0);
        assert_eq!(result.overall_raw_score, 50.0);
        assert_eq!(result.overall_sentiment, Sentiment::Neutral);
        assert!(!result.has_conflicts());
        assert_eq!(result.recommendation, "Neutral / Hold (confidence: low)");
    }
}
