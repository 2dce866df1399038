use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use signal_core::{Category, Confidence, SignalRecord};
use std::env;
use std::str::FromStr;

use crate::takeaways::DEFAULT_MAX_TAKEAWAYS;

/// Which category a contribution is grouped under.
///
/// A signal declares its own `category` and, separately, the category of its
/// score contribution. Aggregation keys on the contribution by default since
/// that is where the analyzer states its scoring intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKey {
    #[default]
    Contribution,
    Signal,
}

impl CategoryKey {
    /// Topic a signal is scored under. Non-voting signals fall back to their own category.
    pub fn category_of<'a>(&self, signal: &'a SignalRecord) -> &'a Category {
        match (self, &signal.score_contribution) {
            (CategoryKey::Contribution, Some(contribution)) => &contribution.category,
            _ => &signal.category,
        }
    }
}

impl FromStr for CategoryKey {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "contribution" => Ok(CategoryKey::Contribution),
            "signal" => Ok(CategoryKey::Signal),
            other => bail!("Unknown category key '{}' (expected contribution or signal)", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub max_takeaways: usize,                 // 5
    pub category_key: CategoryKey,            // contribution
    pub conflict_min_confidence: Confidence,  // medium
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_takeaways: DEFAULT_MAX_TAKEAWAYS,
            category_key: CategoryKey::Contribution,
            conflict_min_confidence: Confidence::Medium,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            max_takeaways: env::var("SYNTHESIS_MAX_TAKEAWAYS")
                .unwrap_or_else(|_| DEFAULT_MAX_TAKEAWAYS.to_string())
                .parse()?,
            category_key: env::var("SYNTHESIS_CATEGORY_KEY")
                .unwrap_or_else(|_| "contribution".to_string())
                .parse()?,
            conflict_min_confidence: parse_confidence(
                &env::var("SYNTHESIS_CONFLICT_MIN_CONFIDENCE")
                    .unwrap_or_else(|_| "medium".to_string()),
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_takeaways == 0 {
            bail!("SYNTHESIS_MAX_TAKEAWAYS must be at least 1");
        }
        Ok(())
    }
}

/// Strict counterpart of the lenient record parsing: config typos should fail loudly
fn parse_confidence(raw: &str) -> Result<Confidence> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "low" => Ok(Confidence::Low),
        "medium" => Ok(Confidence::Medium),
        "high" => Ok(Confidence::High),
        other => bail!("Unknown confidence level '{}' (expected low, medium or high)", other),
    }
}
