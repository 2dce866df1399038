//! Signal Synthesis Engine
//!
//! Merges a batch of independently produced [`SignalRecord`]s into one
//! [`SynthesisResult`]: category roll-ups, a composite score, an overall
//! sentiment, surfaced conflicts, headline takeaways and action items.
//!
//! The pipeline is a single pass (collect, aggregate, score, detect conflicts,
//! summarize). Every stage reads the original batch; none of them mutate it.

pub mod aggregator;
pub mod collector;
pub mod composite;
pub mod config;
pub mod conflicts;
pub mod result;
pub mod takeaways;

pub use aggregator::{aggregate_categories, CategoryScore, BEARISH_THRESHOLD, BULLISH_THRESHOLD};
pub use collector::{collect_insights, collect_metrics, CollectedInsight, CollectedMetric, InsightGroups};
pub use composite::{score_composite, CompositeScore};
pub use config::{CategoryKey, EngineConfig};
pub use conflicts::{detect_conflicts, Conflict, ConflictSide};
pub use result::SynthesisResult;
pub use takeaways::{derive_action_items, select_takeaways, ActionItem, KeyTakeaway, Urgency};

use signal_core::SignalRecord;

/// Stateless synthesizer. Holds only configuration, so one instance can be
/// shared across threads and called concurrently.
#[derive(Debug, Clone, Default)]
pub struct SynthesisEngine {
    config: EngineConfig,
}

impl SynthesisEngine {
    /// Engine with default configuration
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Synthesize one batch.
    ///
    /// Subjects are not validated: a batch mixing tickers is processed as given
    /// and reported under the first record's subject.
    pub fn synthesize(&self, signals: &[SignalRecord]) -> SynthesisResult {
        let Some(first) = signals.first() else {
            tracing::debug!("Empty signal batch, returning neutral synthesis");
            return SynthesisResult::empty();
        };

        let subject = first.subject.clone();
        if let Some(other) = signals.iter().find(|s| s.subject != subject) {
            tracing::warn!(
                "Signal batch mixes subjects ({} and {}); synthesizing as {}",
                subject,
                other.subject,
                subject
            );
        }

        tracing::debug!("Synthesizing {} signals for {}", signals.len(), subject);

        let metrics = collect_metrics(signals);
        let insights = collect_insights(signals);

        let category_scores = aggregate_categories(signals, self.config.category_key);
        let composite = score_composite(signals);

        let conflicts = detect_conflicts(
            signals,
            self.config.category_key,
            self.config.conflict_min_confidence,
        );

        let key_takeaways = select_takeaways(&insights, self.config.max_takeaways);
        let action_items = derive_action_items(&insights);

        let key_metrics: Vec<CollectedMetric> =
            metrics.into_iter().filter(|m| m.metric.tier() == 1).collect();

        let recommendation = result::recommendation(
            composite.sentiment,
            composite.confidence,
            !conflicts.is_empty(),
        );

        tracing::info!(
            "Synthesis for {}: {} score {:.1} ({} categories, {} conflicts, {} actions)",
            subject,
            composite.sentiment,
            composite.score,
            category_scores.len(),
            conflicts.len(),
            action_items.len()
        );

        SynthesisResult {
            subject,
            as_of: signals.iter().filter_map(|s| s.as_of).max(),
            signal_count: signals.len(),
            overall_sentiment: composite.sentiment,
            overall_score: composite.score,
            overall_raw_score: composite.raw_score,
            overall_confidence: composite.confidence,
            recommendation,
            category_scores,
            key_metrics,
            key_takeaways,
            conflicts,
            action_items,
        }
    }
}

/// Synthesize with the default configuration
pub fn synthesize(signals: &[SignalRecord]) -> SynthesisResult {
    SynthesisEngine::new().synthesize(signals)
}
