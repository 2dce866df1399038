//! Category Aggregator
//!
//! Groups score contributions by category and reduces each group to a
//! weighted mean. Categories nobody voted in are left out entirely.

use serde::Serialize;
use signal_core::{Category, Sentiment, SignalRecord, WeightedTally, NEUTRAL_SCORE};
use std::collections::BTreeMap;

use crate::config::CategoryKey;

/// Distance from the midpoint a score must reach to count as directional
pub const SENTIMENT_BAND: f64 = 10.0;
/// Scores at or above this are bullish
pub const BULLISH_THRESHOLD: f64 = NEUTRAL_SCORE + SENTIMENT_BAND;
/// Scores at or below this are bearish
pub const BEARISH_THRESHOLD: f64 = NEUTRAL_SCORE - SENTIMENT_BAND;

/// Roll-up for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScore {
    /// Weighted mean, 0-100
    pub score: f64,
    /// Weighted mean before clamping (-100..=100)
    pub raw_score: f64,
    pub sentiment: Sentiment,
    pub contributing_count: usize,
    pub total_weight: f64,
}

/// Label a score using the symmetric thresholds.
///
/// Inside the neutral band the label is `Mixed` when the contributing signals
/// themselves disagree, `Neutral` otherwise.
pub fn score_sentiment(score: f64, has_bullish: bool, has_bearish: bool) -> Sentiment {
    if score >= BULLISH_THRESHOLD {
        Sentiment::Bullish
    } else if score <= BEARISH_THRESHOLD {
        Sentiment::Bearish
    } else if has_bullish && has_bearish {
        Sentiment::Mixed
    } else {
        Sentiment::Neutral
    }
}

#[derive(Default)]
struct CategoryAccumulator {
    tally: WeightedTally,
    has_bullish: bool,
    has_bearish: bool,
}

/// Compute per-category weighted scores from every signal that carries a contribution
pub fn aggregate_categories(
    signals: &[SignalRecord],
    key: CategoryKey,
) -> BTreeMap<Category, CategoryScore> {
    let mut accumulators: BTreeMap<Category, CategoryAccumulator> = BTreeMap::new();

    for signal in signals {
        let Some(contribution) = &signal.score_contribution else {
            continue;
        };

        let category = key.category_of(signal).clone();
        let acc = accumulators.entry(category).or_default();
        acc.tally
            .add(contribution.effective_score(), contribution.effective_weight());
        match signal.sentiment {
            Sentiment::Bullish => acc.has_bullish = true,
            Sentiment::Bearish => acc.has_bearish = true,
            Sentiment::Neutral | Sentiment::Mixed => {}
        }
    }

    accumulators
        .into_iter()
        .filter_map(|(category, acc)| {
            let score = acc.tally.mean()?;
            let raw_score = acc.tally.raw_mean()?;
            tracing::debug!(
                "Category {}: score {:.1} from {} contributions (total weight {:.2})",
                category,
                score,
                acc.tally.count(),
                acc.tally.total_weight()
            );
            Some((
                category,
                CategoryScore {
                    score,
                    raw_score,
                    sentiment: score_sentiment(score, acc.has_bullish, acc.has_bearish),
                    contributing_count: acc.tally.count(),
                    total_weight: acc.tally.total_weight(),
                },
            ))
        })
        .collect()
}
