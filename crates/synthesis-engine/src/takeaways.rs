//! Takeaway/Action Generator

use serde::Serialize;
use signal_core::InsightType;
use std::collections::HashSet;

use crate::collector::{CollectedInsight, InsightGroups};

pub const DEFAULT_MAX_TAKEAWAYS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyTakeaway {
    #[serde(rename = "type")]
    pub kind: InsightType,
    pub message: String,
    pub importance: u8,
    pub source_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Immediate,
    Soon,
    Monitor,
}

impl Urgency {
    pub fn from_tier(tier: u8) -> Self {
        match tier {
            0 | 1 => Urgency::Immediate,
            2 => Urgency::Soon,
            _ => Urgency::Monitor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionItem {
    pub action: String,
    pub urgency: Urgency,
    pub source_id: String,
}

/// Keep the first occurrence of each exact message
fn dedup_by_message<'a>(
    insights: impl IntoIterator<Item = &'a CollectedInsight>,
) -> impl Iterator<Item = &'a CollectedInsight> {
    let mut seen: HashSet<&'a str> = HashSet::new();
    insights
        .into_iter()
        .filter(move |insight| seen.insert(insight.message.as_str()))
}

/// Top `max` insights by importance tier, input order within a tier
pub fn select_takeaways(groups: &InsightGroups, max: usize) -> Vec<KeyTakeaway> {
    dedup_by_message(groups.ranked())
        .take(max)
        .map(|insight| KeyTakeaway {
            kind: insight.kind,
            message: insight.message.clone(),
            importance: insight.importance,
            source_id: insight.source_id.clone(),
        })
        .collect()
}

/// Every action insight, plus risks at importance tier 1
pub fn derive_action_items(groups: &InsightGroups) -> Vec<ActionItem> {
    let candidates = groups.ranked().into_iter().filter(|insight| match insight.kind {
        InsightType::Action => true,
        InsightType::Risk => insight.importance == 1,
        InsightType::Strength
        | InsightType::Weakness
        | InsightType::Opportunity
        | InsightType::Observation => false,
    });

    dedup_by_message(candidates)
        .map(|insight| ActionItem {
            action: insight.message.clone(),
            urgency: Urgency::from_tier(insight.importance),
            source_id: insight.source_id.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::collect_insights;
    use signal_core::{Category, Confidence, Sentiment, SignalRecord};

    fn create_test_signal(source_id: &str) -> SignalRecord {
        SignalRecord::new(source_id, "JPM", Category::Quality, Sentiment::Neutral, Confidence::Medium)
    }

    #[test]
    fn test_takeaway_cap_prefers_tier_one() {
        let mut signal = create_test_signal("many");
        for i in 0..5 {
            signal = signal.with_insight(InsightType::Observation, format!("minor {}", i), 2);
        }
        for i in 0..10 {
            signal = signal.with_insight(InsightType::Strength, format!("critical {}", i), 1);
        }

        let takeaways = select_takeaways(&collect_insights(&[signal]), DEFAULT_MAX_TAKEAWAYS);
        let messages: Vec<&str> = takeaways.iter().map(|t| t.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["critical 0", "critical 1", "critical 2", "critical 3", "critical 4"]
        );
        assert!(takeaways.iter().all(|t| t.importance == 1));
    }

    #[test]
    fn test_tier_three_fills_remaining_slots() {
        let signals = vec![
            create_test_signal("a")
                .with_insight(InsightType::Observation, "footnote", 3)
                .with_insight(InsightType::Risk, "headline risk", 1),
            create_test_signal("b").with_insight(InsightType::Opportunity, "buyback", 2),
        ];

        let takeaways = select_takeaways(&collect_insights(&signals), 5);
        let messages: Vec<&str> = takeaways.iter().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, vec!["headline risk", "buyback", "footnote"]);
    }

    #[test]
    fn test_duplicates_removed_before_truncation() {
        let signals = vec![
            create_test_signal("a")
                .with_insight(InsightType::Risk, "Earnings next week", 1)
                .with_insight(InsightType::Strength, "Strong balance sheet", 1),
            create_test_signal("b")
                .with_insight(InsightType::Risk, "Earnings next week", 1)
                .with_insight(InsightType::Strength, "Dividend raised", 1),
        ];

        let takeaways = select_takeaways(&collect_insights(&signals), 3);
        let messages: Vec<&str> = takeaways.iter().map(|t| t.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["Earnings next week", "Strong balance sheet", "Dividend raised"]
        );
        assert_eq!(takeaways[0].source_id, "a");
    }

    #[test]
    fn test_action_items() {
        let signals = vec![
            create_test_signal("stops")
                .with_insight(InsightType::Action, "Tighten stop to $140", 2)
                .with_insight(InsightType::Risk, "Guidance cut likely", 1)
                .with_insight(InsightType::Risk, "Minor FX drag", 2),
            create_test_signal("rebalance")
                .with_insight(InsightType::Action, "Review position size", 3)
                .with_insight(InsightType::Action, "Trim before earnings", 1)
                .with_insight(InsightType::Strength, "Strong moat", 1),
        ];

        let items = derive_action_items(&collect_insights(&signals));
        let summary: Vec<(&str, Urgency)> = items.iter().map(|a| (a.action.as_str(), a.urgency)).collect();
        assert_eq!(
            summary,
            vec![
                ("Guidance cut likely", Urgency::Immediate),
                ("Trim before earnings", Urgency::Immediate),
                ("Tighten stop to $140", Urgency::Soon),
                ("Review position size", Urgency::Monitor),
            ]
        );
    }

    #[test]
    fn test_urgency_mapping() {
        assert_eq!(Urgency::from_tier(1), Urgency::Immediate);
        assert_eq!(Urgency::from_tier(2), Urgency::Soon);
        assert_eq!(Urgency::from_tier(3), Urgency::Monitor);
    }
}
