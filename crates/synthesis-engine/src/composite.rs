//! Composite Scorer
//!
//! The overall score and the overall sentiment are computed independently:
//! the score is a weighted mean of every contribution, the sentiment is a
//! head count of directional calls. They are allowed to disagree.

use serde::Serialize;
use signal_core::{Confidence, Sentiment, SignalRecord, WeightedTally, NEUTRAL_SCORE};

/// A side wins the vote only with strictly more than 3/5 of all signals
pub const MAJORITY_NUMERATOR: usize = 3;
pub const MAJORITY_DENOMINATOR: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompositeScore {
    /// 0-100
    pub score: f64,
    /// Weighted mean before clamping (-100..=100)
    pub raw_score: f64,
    pub sentiment: Sentiment,
    pub confidence: Confidence,
    /// Signals that carried a score contribution
    pub voting_count: usize,
}

pub fn score_composite(signals: &[SignalRecord]) -> CompositeScore {
    let tally: WeightedTally = signals
        .iter()
        .filter_map(|signal| signal.score_contribution.as_ref())
        .map(|c| (c.effective_score(), c.effective_weight()))
        .collect();

    CompositeScore {
        score: tally.mean().unwrap_or(NEUTRAL_SCORE),
        raw_score: tally.raw_mean().unwrap_or(NEUTRAL_SCORE),
        sentiment: overall_sentiment(signals),
        confidence: overall_confidence(signals),
        voting_count: tally.count(),
    }
}

/// Weighted mean across all contributions regardless of category; 50 when nothing votes
pub fn overall_score(signals: &[SignalRecord]) -> f64 {
    score_composite(signals).score
}

/// Majority vote over the signals' own directional calls
pub fn overall_sentiment(signals: &[SignalRecord]) -> Sentiment {
    let total = signals.len();
    if total == 0 {
        return Sentiment::Neutral;
    }

    let bullish = signals.iter().filter(|s| s.sentiment == Sentiment::Bullish).count();
    let bearish = signals.iter().filter(|s| s.sentiment == Sentiment::Bearish).count();
    let dominates = |count: usize| count * MAJORITY_DENOMINATOR > total * MAJORITY_NUMERATOR;

    if dominates(bullish) {
        Sentiment::Bullish
    } else if dominates(bearish) {
        Sentiment::Bearish
    } else if bullish > 0 && bearish > 0 {
        Sentiment::Mixed
    } else {
        Sentiment::Neutral
    }
}

/// Most common confidence level; ties go to the lower level
pub fn overall_confidence(signals: &[SignalRecord]) -> Confidence {
    let count = |level: Confidence| signals.iter().filter(|s| s.confidence == level).count();

    let mut modal = Confidence::Low;
    let mut modal_count = count(Confidence::Low);
    for level in [Confidence::Medium, Confidence::High] {
        let n = count(level);
        if n > modal_count {
            modal = level;
            modal_count = n;
        }
    }
    modal
}
