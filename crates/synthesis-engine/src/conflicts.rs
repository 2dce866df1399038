//! Conflict Detector
//!
//! Runs over the same inputs as aggregation but never feeds back into it:
//! the weighted means keep the raw disagreement, and this pass reports where
//! that disagreement lives.

use serde::Serialize;
use signal_core::{Confidence, Sentiment, SignalRecord};

use crate::config::CategoryKey;

/// Weights closer than this are treated as equal when resolving a conflict
pub const WEIGHT_EPSILON: f64 = 1e-6;

pub const UNRESOLVED_NOTE: &str = "Unresolved, monitor both";

/// One side of a conflict, with its claim quoted verbatim
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictSide {
    pub source_id: String,
    pub sentiment: Sentiment,
    pub confidence: Confidence,
    pub claim: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conflict {
    /// Shared category name or tag
    pub topic: String,
    pub side_a: ConflictSide,
    pub side_b: ConflictSide,
    pub resolution: String,
    /// Direction the engine leans, `None` when unresolved
    pub leaning: Option<Sentiment>,
}

/// Find every same-topic pair with opposing directional calls
pub fn detect_conflicts(
    signals: &[SignalRecord],
    key: CategoryKey,
    min_confidence: Confidence,
) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    for (i, a) in signals.iter().enumerate() {
        if a.confidence < min_confidence {
            continue;
        }
        for b in &signals[i + 1..] {
            if b.confidence < min_confidence || !a.sentiment.opposes(b.sentiment) {
                continue;
            }
            let Some(topic) = shared_topic(a, b, key) else {
                continue;
            };

            let (resolution, leaning) = resolve(a, b);
            tracing::debug!(
                "Conflict on {}: {} ({}) vs {} ({})",
                topic,
                a.source_id,
                a.sentiment,
                b.source_id,
                b.sentiment
            );
            conflicts.push(Conflict {
                topic,
                side_a: side_of(a),
                side_b: side_of(b),
                resolution,
                leaning,
            });
        }
    }

    conflicts
}

/// Same scoring category, else the first tag of `a` that `b` also carries
fn shared_topic(a: &SignalRecord, b: &SignalRecord, key: CategoryKey) -> Option<String> {
    let category_a = key.category_of(a);
    if category_a == key.category_of(b) {
        return Some(category_a.to_string());
    }

    a.tags
        .iter()
        .find(|tag| b.tags.iter().any(|other| other.eq_ignore_ascii_case(tag)))
        .map(|tag| tag.to_ascii_lowercase())
}

fn side_of(signal: &SignalRecord) -> ConflictSide {
    let claim = signal
        .headline_insight()
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}: {}", signal.source_id, signal.sentiment));

    ConflictSide {
        source_id: signal.source_id.clone(),
        sentiment: signal.sentiment,
        confidence: signal.confidence,
        claim,
    }
}

/// Lean toward the side with more score weight, then higher confidence, then
/// higher signal strength
fn resolve(a: &SignalRecord, b: &SignalRecord) -> (String, Option<Sentiment>) {
    let (weight_a, weight_b) = (a.voting_weight(), b.voting_weight());
    if (weight_a - weight_b).abs() > WEIGHT_EPSILON {
        let (winner, w_win, w_lose) = if weight_a > weight_b {
            (a, weight_a, weight_b)
        } else {
            (b, weight_b, weight_a)
        };
        return lean(
            winner,
            format!("higher score weight ({:.2} vs {:.2})", w_win, w_lose),
        );
    }

    if a.confidence != b.confidence {
        let (winner, loser) = if a.confidence > b.confidence { (a, b) } else { (b, a) };
        return lean(
            winner,
            format!("higher confidence ({} vs {})", winner.confidence, loser.confidence),
        );
    }

    if a.strength() != b.strength() {
        let (winner, loser) = if a.strength() > b.strength() { (a, b) } else { (b, a) };
        return lean(
            winner,
            format!("higher signal strength ({} vs {})", winner.strength(), loser.strength()),
        );
    }

    (UNRESOLVED_NOTE.to_string(), None)
}

fn lean(winner: &SignalRecord, reason: String) -> (String, Option<Sentiment>) {
    (
        format!("Leaning {} ({}): {}", winner.sentiment, winner.source_id, reason),
        Some(winner.sentiment),
    )
}
