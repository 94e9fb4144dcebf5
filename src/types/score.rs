//! Preview score breakdown types.
//!
//! These are derived, read-only views produced by the preview scorer. They
//! never feed back into the weights.

use serde::{Deserialize, Serialize};

use super::weights::LayerKey;

/// How one layer contributed to the preview score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerContribution {
    pub layer: LayerKey,
    /// Sample raw score for the layer (0 - 100)
    pub raw_score: f64,
    /// Layer weight in percent
    pub weight: u8,
    /// raw_score * weight / 100
    pub contribution: f64,
}

/// Full preview score computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    /// Per-layer contributions in canonical layer order
    pub layers: Vec<LayerContribution>,
    /// Sum of layer contributions
    pub weighted_total: f64,
    /// Secondary term driven by metric weights
    pub bias: f64,
    /// round(weighted_total + bias), clamped to 0 - 100
    pub score: u8,
}
