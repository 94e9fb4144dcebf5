//! Data types used throughout the dealscore library.
//!
//! This module is organized by domain:
//! - [`weights`] - Weight keys, weight sets and the layer/metric profile
//! - [`score`] - Preview score breakdown types

pub mod score;
pub mod weights;

pub use score::{LayerContribution, ScoreBreakdown};

pub use weights::{
    clamp_percent, LayerKey, MetricKey, WeightKey, WeightProfile, WeightSet, WEIGHT_TOTAL,
};
