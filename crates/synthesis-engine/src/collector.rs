//! Metric/Insight Collector
//!
//! Flattens metrics and insights across a batch while keeping priority order
//! stable: tier first, then the position the item had in the input.

use serde::Serialize;
use signal_core::{InsightType, Metric, SignalRecord};

/// A metric tagged with the signal it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectedMetric {
    pub source_id: String,
    #[serde(flatten)]
    pub metric: Metric,
    /// Position across the whole flattened batch
    #[serde(skip)]
    pub ordinal: usize,
}

/// An insight tagged with the signal it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectedInsight {
    pub source_id: String,
    #[serde(rename = "type")]
    pub kind: InsightType,
    pub message: String,
    pub importance: u8,
    #[serde(skip)]
    pub ordinal: usize,
}

/// Insights grouped by type, each group ordered by importance then input order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InsightGroups {
    pub strengths: Vec<CollectedInsight>,
    pub weaknesses: Vec<CollectedInsight>,
    pub opportunities: Vec<CollectedInsight>,
    pub risks: Vec<CollectedInsight>,
    pub observations: Vec<CollectedInsight>,
    pub actions: Vec<CollectedInsight>,
}

impl InsightGroups {
    pub fn get(&self, kind: InsightType) -> &[CollectedInsight] {
        match kind {
            InsightType::Strength => &self.strengths,
            InsightType::Weakness => &self.weaknesses,
            InsightType::Opportunity => &self.opportunities,
            InsightType::Risk => &self.risks,
            InsightType::Observation => &self.observations,
            InsightType::Action => &self.actions,
        }
    }

    fn get_mut(&mut self, kind: InsightType) -> &mut Vec<CollectedInsight> {
        match kind {
            InsightType::Strength => &mut self.strengths,
            InsightType::Weakness => &mut self.weaknesses,
            InsightType::Opportunity => &mut self.opportunities,
            InsightType::Risk => &mut self.risks,
            InsightType::Observation => &mut self.observations,
            InsightType::Action => &mut self.actions,
        }
    }

    pub fn len(&self) -> usize {
        InsightType::ALL.iter().map(|kind| self.get(*kind).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every insight across all groups, ordered by importance tier then input order
    pub fn ranked(&self) -> Vec<&CollectedInsight> {
        let mut all: Vec<&CollectedInsight> = InsightType::ALL
            .iter()
            .flat_map(|kind| self.get(*kind).iter())
            .collect();
        all.sort_by_key(|insight| (insight.importance, insight.ordinal));
        all
    }
}

/// Flatten all metrics, ordered by priority tier then input order
pub fn collect_metrics(signals: &[SignalRecord]) -> Vec<CollectedMetric> {
    let mut metrics: Vec<CollectedMetric> = signals
        .iter()
        .flat_map(|signal| {
            signal.metrics.iter().map(move |metric| (signal.source_id.as_str(), metric))
        })
        .enumerate()
        .map(|(ordinal, (source_id, metric))| CollectedMetric {
            source_id: source_id.to_string(),
            metric: metric.clone(),
            ordinal,
        })
        .collect();

    metrics.sort_by_key(|m| (m.metric.tier(), m.ordinal));
    metrics
}

/// Group all insights by type
pub fn collect_insights(signals: &[SignalRecord]) -> InsightGroups {
    let mut groups = InsightGroups::default();

    let flattened = signals.iter().flat_map(|signal| {
        signal.insights.iter().map(move |insight| (signal.source_id.as_str(), insight))
    });

    for (ordinal, (source_id, insight)) in flattened.enumerate() {
        groups.get_mut(insight.kind).push(CollectedInsight {
            source_id: source_id.to_string(),
            kind: insight.kind,
            message: insight.message.clone(),
            importance: insight.tier(),
            ordinal,
        });
    }

    for kind in InsightType::ALL {
        groups
            .get_mut(kind)
            .sort_by_key(|insight| (insight.importance, insight.ordinal));
    }

    groups
}
