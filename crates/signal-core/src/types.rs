use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Tier assigned to metrics and insights that omit one (least important)
pub const DEFAULT_TIER: u8 = 3;

/// Strength assigned to signals that omit one (middle of the 1-5 scale)
pub const DEFAULT_SIGNAL_STRENGTH: u8 = 3;

/// Clamp a priority/importance tier into 1 (primary) ..= 3 (supporting)
pub fn clamp_tier(tier: u8) -> u8 {
    tier.clamp(1, 3)
}

/// Top-level grouping used to scope weighted aggregation.
///
/// Unknown names become [`Category::Other`] so an unexpected category is its own
/// bucket instead of a rejected record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Valuation,
    Quality,
    Momentum,
    Risk,
    Income,
    Growth,
    Sentiment,
    Technical,
    Ownership,
    Options,
    Macro,
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Valuation => "valuation",
            Category::Quality => "quality",
            Category::Momentum => "momentum",
            Category::Risk => "risk",
            Category::Income => "income",
            Category::Growth => "growth",
            Category::Sentiment => "sentiment",
            Category::Technical => "technical",
            Category::Ownership => "ownership",
            Category::Options => "options",
            Category::Macro => "macro",
            Category::Other(name) => name.as_str(),
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Other("uncategorized".to_string())
    }
}

impl From<&str> for Category {
    fn from(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "valuation" => Category::Valuation,
            "quality" => Category::Quality,
            "momentum" => Category::Momentum,
            "risk" => Category::Risk,
            "income" => Category::Income,
            "growth" => Category::Growth,
            "sentiment" => Category::Sentiment,
            "technical" => Category::Technical,
            "ownership" => Category::Ownership,
            "options" => Category::Options,
            "macro" => Category::Macro,
            _ => Category::Other(trimmed.to_ascii_lowercase()),
        }
    }
}

impl From<String> for Category {
    fn from(raw: String) -> Self {
        Category::from(raw.as_str())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directional call of a signal (or of the synthesis as a whole)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Sentiment {
    Bullish,
    Bearish,
    #[default]
    Neutral,
    Mixed,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Bullish => "bullish",
            Sentiment::Bearish => "bearish",
            Sentiment::Neutral => "neutral",
            Sentiment::Mixed => "mixed",
        }
    }

    /// True when one side is bullish and the other bearish.
    /// Neutral and mixed calls never oppose anything.
    pub fn opposes(&self, other: Sentiment) -> bool {
        matches!(
            (self, other),
            (Sentiment::Bullish, Sentiment::Bearish) | (Sentiment::Bearish, Sentiment::Bullish)
        )
    }
}

impl From<String> for Sentiment {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bullish" => Sentiment::Bullish,
            "bearish" => Sentiment::Bearish,
            "mixed" => Sentiment::Mixed,
            _ => Sentiment::Neutral,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Analyzer certainty. Ordered `Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Confidence {
    #[default]
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

impl From<String> for Confidence {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Confidence::High,
            "medium" | "moderate" => Confidence::Medium,
            _ => Confidence::Low,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative reading an analyzer attaches to a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum MetricInterpretation {
    Excellent,
    Good,
    Fair,
    Neutral,
    Poor,
    Critical,
    Undervalued,
    FairlyValued,
    Overvalued,
    Bullish,
    Bearish,
    #[default]
    Unrated,
}

impl From<String> for MetricInterpretation {
    fn from(raw: String) -> Self {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "excellent" => MetricInterpretation::Excellent,
            "good" => MetricInterpretation::Good,
            "fair" => MetricInterpretation::Fair,
            "neutral" => MetricInterpretation::Neutral,
            "poor" => MetricInterpretation::Poor,
            "critical" => MetricInterpretation::Critical,
            "undervalued" => MetricInterpretation::Undervalued,
            "fairly_valued" | "fair_value" => MetricInterpretation::FairlyValued,
            "overvalued" => MetricInterpretation::Overvalued,
            "bullish" => MetricInterpretation::Bullish,
            "bearish" => MetricInterpretation::Bearish,
            _ => MetricInterpretation::Unrated,
        }
    }
}

/// Kind of interpretive statement an insight makes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum InsightType {
    Strength,
    Weakness,
    Opportunity,
    Risk,
    #[default]
    Observation,
    Action,
}

impl InsightType {
    pub const ALL: [InsightType; 6] = [
        InsightType::Strength,
        InsightType::Weakness,
        InsightType::Opportunity,
        InsightType::Risk,
        InsightType::Observation,
        InsightType::Action,
    ];
}

impl From<String> for InsightType {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strength" => InsightType::Strength,
            "weakness" => InsightType::Weakness,
            "opportunity" => InsightType::Opportunity,
            "risk" => InsightType::Risk,
            "action" => InsightType::Action,
            _ => InsightType::Observation,
        }
    }
}

/// Metric value as emitted by an analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Flag(bool),
    Text(String),
}

impl Default for MetricValue {
    fn default() -> Self {
        MetricValue::Text(String::new())
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(n) => write!(f, "{}", n),
            MetricValue::Flag(b) => write!(f, "{}", b),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

/// Named, interpreted metric value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metric {
    #[serde(default, deserialize_with = "lenient_default")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_default")]
    pub value: MetricValue,
    #[serde(
        default,
        deserialize_with = "lenient_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "lenient_default")]
    pub interpretation: MetricInterpretation,
    /// 1 = primary .. 3 = supporting
    #[serde(default = "default_tier", deserialize_with = "lenient_tier")]
    pub priority: u8,
}

impl Metric {
    pub fn tier(&self) -> u8 {
        clamp_tier(self.priority)
    }
}

/// Short interpretive statement produced by an analyzer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type", default, deserialize_with = "lenient_default")]
    pub kind: InsightType,
    #[serde(default, deserialize_with = "lenient_default")]
    pub message: String,
    /// 1 = critical .. 3 = minor
    #[serde(default = "default_tier", deserialize_with = "lenient_tier")]
    pub importance: u8,
}

impl Insight {
    pub fn tier(&self) -> u8 {
        clamp_tier(self.importance)
    }
}

/// An analyzer's vote into the composite, scoped to one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreContribution {
    #[serde(default, deserialize_with = "lenient_default")]
    pub category: Category,
    /// -100 to 100
    pub score: f64,
    /// 0.0 to 1.0, meaningful only relative to other weights in the same category
    pub weight: f64,
}

impl ScoreContribution {
    /// Score clamped to -100..=100; non-finite scores read as 0
    pub fn effective_score(&self) -> f64 {
        if self.score.is_finite() {
            self.score.clamp(-100.0, 100.0)
        } else {
            0.0
        }
    }

    /// Weight clamped to 0..=1; negative or non-finite weights read as 0
    pub fn effective_weight(&self) -> f64 {
        if self.weight.is_finite() {
            self.weight.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Standardized verdict emitted by one card analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    #[serde(alias = "sourceId", alias = "cardId")]
    pub source_id: String,
    #[serde(default, deserialize_with = "lenient_default")]
    pub category: Category,
    #[serde(default, deserialize_with = "lenient_default")]
    pub subject: String,
    #[serde(
        default,
        alias = "asOf",
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub as_of: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_default")]
    pub sentiment: Sentiment,
    #[serde(default, deserialize_with = "lenient_default")]
    pub confidence: Confidence,
    /// 1-5 magnitude, independent of sentiment and confidence
    #[serde(
        default = "default_signal_strength",
        alias = "signalStrength",
        deserialize_with = "lenient_strength"
    )]
    pub signal_strength: u8,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub metrics: Vec<Metric>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub insights: Vec<Insight>,
    /// Absent (or malformed) means the signal does not vote
    #[serde(
        default,
        alias = "scoreContribution",
        deserialize_with = "lenient_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub score_contribution: Option<ScoreContribution>,
    #[serde(default, alias = "relatedSignals", deserialize_with = "lenient_vec")]
    pub related_signals: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub tags: Vec<String>,
}

impl SignalRecord {
    pub fn new(
        source_id: impl Into<String>,
        subject: impl Into<String>,
        category: Category,
        sentiment: Sentiment,
        confidence: Confidence,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            category,
            subject: subject.into(),
            as_of: None,
            sentiment,
            confidence,
            signal_strength: DEFAULT_SIGNAL_STRENGTH,
            metrics: Vec::new(),
            insights: Vec::new(),
            score_contribution: None,
            related_signals: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_contribution(mut self, category: Category, score: f64, weight: f64) -> Self {
        self.score_contribution = Some(ScoreContribution {
            category,
            score,
            weight,
        });
        self
    }

    pub fn with_insight(mut self, kind: InsightType, message: impl Into<String>, importance: u8) -> Self {
        self.insights.push(Insight {
            kind,
            message: message.into(),
            importance,
        });
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metrics.push(metric);
        self
    }

    /// Strength clamped to 1..=5
    pub fn strength(&self) -> u8 {
        self.signal_strength.clamp(1, 5)
    }

    /// Weight this signal carries into the composite (0 when non-voting)
    pub fn voting_weight(&self) -> f64 {
        self.score_contribution
            .as_ref()
            .map(ScoreContribution::effective_weight)
            .unwrap_or(0.0)
    }

    /// Message of the most important insight; earliest wins within a tier
    pub fn headline_insight(&self) -> Option<&str> {
        self.insights
            .iter()
            .enumerate()
            .min_by_key(|(idx, insight)| (insight.tier(), *idx))
            .map(|(_, insight)| insight.message.as_str())
    }
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn default_tier() -> u8 {
    DEFAULT_TIER
}

fn default_signal_strength() -> u8 {
    DEFAULT_SIGNAL_STRENGTH
}

fn integer_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_tier<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(integer_from_value)
        .map(|n| n.clamp(1, 3) as u8)
        .unwrap_or(DEFAULT_TIER))
}

fn lenient_strength<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(integer_from_value)
        .map(|n| n.clamp(1, 5) as u8)
        .unwrap_or(DEFAULT_SIGNAL_STRENGTH))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(raw)) => parse_timestamp(&raw),
        _ => None,
    })
}

/// `null` or a value of the wrong shape reads as the field's default
fn lenient_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default())
}

fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Drops elements that fail to decode instead of failing the whole record
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_record_defaults() {
        let record: SignalRecord = serde_json::from_value(json!({
            "source_id": "pe-ratio",
        }))
        .unwrap();

        assert_eq!(record.category, Category::default());
        assert_eq!(record.sentiment, Sentiment::Neutral);
        assert_eq!(record.confidence, Confidence::Low);
        assert_eq!(record.signal_strength, DEFAULT_SIGNAL_STRENGTH);
        assert!(record.metrics.is_empty());
        assert!(record.insights.is_empty());
        assert!(record.score_contribution.is_none());
        assert!(record.as_of.is_none());
    }

    #[test]
    fn test_camel_case_aliases() {
        let record: SignalRecord = serde_json::from_value(json!({
            "sourceId": "insider-activity",
            "category": "ownership",
            "subject": "AAPL",
            "asOf": "2024-03-15",
            "sentiment": "Bearish",
            "confidence": "HIGH",
            "signalStrength": 4,
            "scoreContribution": { "category": "ownership", "score": -40, "weight": 0.5 },
            "relatedSignals": ["institutional-flow"],
        }))
        .unwrap();

        assert_eq!(record.source_id, "insider-activity");
        assert_eq!(record.category, Category::Ownership);
        assert_eq!(record.sentiment, Sentiment::Bearish);
        assert_eq!(record.confidence, Confidence::High);
        assert_eq!(record.signal_strength, 4);
        assert_eq!(record.related_signals, vec!["institutional-flow".to_string()]);
        assert_eq!(
            record.as_of,
            Some(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap().and_hms_opt(0, 0, 0).unwrap().and_utc())
        );
        let contribution = record.score_contribution.unwrap();
        assert_eq!(contribution.category, Category::Ownership);
        assert!((contribution.weight - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_category_is_own_bucket() {
        assert_eq!(Category::from("Valuation"), Category::Valuation);
        assert_eq!(Category::from("esg"), Category::Other("esg".to_string()));
        assert_eq!(Category::from(" ESG "), Category::from("esg"));
        assert_eq!(String::from(Category::Other("esg".to_string())), "esg");
    }

    #[test]
    fn test_malformed_optional_fields_are_defaulted() {
        let record: SignalRecord = serde_json::from_value(json!({
            "source_id": "options-flow",
            "sentiment": "sideways",
            "signal_strength": 11,
            "as_of": "last tuesday",
            "metrics": [
                { "name": "put/call", "value": 0.7, "interpretation": "bullish", "priority": 1 },
                "not a metric",
            ],
            "insights": null,
            "score_contribution": { "category": "options" },
        }))
        .unwrap();

        assert_eq!(record.sentiment, Sentiment::Neutral);
        assert_eq!(record.signal_strength, 5);
        assert!(record.as_of.is_none());
        assert_eq!(record.metrics.len(), 1);
        assert_eq!(record.metrics[0].interpretation, MetricInterpretation::Bullish);
        assert!(record.insights.is_empty());
        assert!(record.score_contribution.is_none());
    }

    #[test]
    fn test_null_fields_read_as_defaults() {
        let record: SignalRecord = serde_json::from_value(json!({
            "source_id": "short-interest",
            "category": null,
            "subject": null,
            "sentiment": null,
            "confidence": null,
            "metrics": [
                { "name": null, "value": null, "unit": 12, "interpretation": null, "priority": 1 },
            ],
            "insights": [
                { "type": null, "message": "Borrow fee spiking", "importance": 1 },
                { "type": "risk", "message": null },
            ],
            "score_contribution": { "category": null, "score": 10, "weight": 1 },
        }))
        .unwrap();

        assert_eq!(record.category, Category::default());
        assert_eq!(record.subject, "");
        assert_eq!(record.sentiment, Sentiment::Neutral);
        assert_eq!(record.confidence, Confidence::Low);

        assert_eq!(record.metrics.len(), 1);
        assert_eq!(record.metrics[0].name, "");
        assert_eq!(record.metrics[0].value, MetricValue::default());
        assert!(record.metrics[0].unit.is_none());
        assert_eq!(record.metrics[0].interpretation, MetricInterpretation::Unrated);

        assert_eq!(record.insights.len(), 2);
        assert_eq!(record.insights[0].kind, InsightType::Observation);
        assert_eq!(record.insights[1].kind, InsightType::Risk);
        assert_eq!(record.insights[1].message, "");

        let contribution = record.score_contribution.unwrap();
        assert_eq!(contribution.category, Category::default());
        assert!((contribution.score - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_tiers_are_clamped() {
        let insight: Insight = serde_json::from_value(json!({
            "type": "risk",
            "message": "Debt maturities cluster in 2025",
            "importance": 0,
        }))
        .unwrap();
        assert_eq!(insight.kind, InsightType::Risk);
        assert_eq!(insight.importance, 1);

        let metric: Metric = serde_json::from_value(json!({
            "name": "ROE",
            "value": "18%",
            "interpretation": "fairly-valued",
            "priority": "7",
        }))
        .unwrap();
        assert_eq!(metric.priority, 3);
        assert_eq!(metric.interpretation, MetricInterpretation::FairlyValued);
        assert_eq!(metric.value, MetricValue::Text("18%".to_string()));
    }

    #[test]
    fn test_contribution_effective_values() {
        let contribution = ScoreContribution {
            category: Category::Risk,
            score: 140.0,
            weight: -0.3,
        };
        assert_eq!(contribution.effective_score(), 100.0);
        assert_eq!(contribution.effective_weight(), 0.0);

        let nan = ScoreContribution {
            category: Category::Risk,
            score: f64::NAN,
            weight: f64::INFINITY,
        };
        assert_eq!(nan.effective_score(), 0.0);
        assert_eq!(nan.effective_weight(), 0.0);
    }

    #[test]
    fn test_headline_insight_prefers_lowest_tier() {
        let record = SignalRecord::new("dcf", "MSFT", Category::Valuation, Sentiment::Bullish, Confidence::High)
            .with_insight(InsightType::Observation, "Margins stable", 2)
            .with_insight(InsightType::Strength, "Trades 20% below intrinsic value", 1)
            .with_insight(InsightType::Strength, "Cash flow covers buybacks", 1);

        assert_eq!(record.headline_insight(), Some("Trades 20% below intrinsic value"));
    }

    #[test]
    fn test_sentiment_opposition() {
        assert!(Sentiment::Bullish.opposes(Sentiment::Bearish));
        assert!(Sentiment::Bearish.opposes(Sentiment::Bullish));
        assert!(!Sentiment::Bullish.opposes(Sentiment::Mixed));
        assert!(!Sentiment::Neutral.opposes(Sentiment::Bearish));
    }

    #[test]
    fn test_confidence_ordering() {
        assert!(Confidence::Low < Confidence::Medium);
        assert!(Confidence::Medium < Confidence::High);
        assert_eq!(Confidence::from("moderate".to_string()), Confidence::Medium);
    }
}
