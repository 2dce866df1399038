//! Signal Core
//!
//! The shared data contract between card analyzers and the synthesis engine.
//! Every analyzer emits a [`SignalRecord`]; the engine only ever reads them.

pub mod batch;
pub mod error;
pub mod types;
pub mod weighting;

pub use batch::{load_batch, parse_batch};
pub use error::*;
pub use types::*;
pub use weighting::{clamp_score, WeightedTally, NEUTRAL_SCORE};
