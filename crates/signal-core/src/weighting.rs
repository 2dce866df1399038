//! Weighted-mean helpers shared by category and composite scoring.
//!
//! Contributions vote on a -100..=100 scale with relative weights. Weights are
//! never normalized globally; each tally normalizes over whatever it was fed,
//! so a category's weights only compete with each other.

/// Midpoint of the 0..=100 composite scale, used whenever nothing can be averaged
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Clamp a score onto the 0..=100 composite scale
pub fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

/// Running `Σ(score·weight) / Σweight` accumulator
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightedTally {
    weighted_sum: f64,
    total_weight: f64,
    count: usize,
}

impl WeightedTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, score: f64, weight: f64) {
        self.weighted_sum += score * weight;
        self.total_weight += weight;
        self.count += 1;
    }

    /// Number of contributions seen, including zero-weight ones
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Weighted mean on the 0..=100 scale.
    ///
    /// `None` when nothing was added. When contributions exist but their weights
    /// sum to zero the mean is [`NEUTRAL_SCORE`] rather than a division by zero.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        if self.total_weight <= 0.0 {
            return Some(NEUTRAL_SCORE);
        }
        self.raw_mean().map(clamp_score)
    }

    /// Weighted mean before clamping, on the contributions' own -100..=100 scale.
    ///
    /// Keeps mild and severe bearish votes apart after [`mean`](Self::mean) has
    /// floored both to 0.
    pub fn raw_mean(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        if self.total_weight <= 0.0 {
            return Some(NEUTRAL_SCORE);
        }
        Some(self.weighted_sum / self.total_weight)
    }
}

impl FromIterator<(f64, f64)> for WeightedTally {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        let mut tally = WeightedTally::new();
        for (score, weight) in iter {
            tally.add(score, weight);
        }
        tally
    }
}
