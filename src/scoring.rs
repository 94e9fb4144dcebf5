//! Live preview of the composite deal score.
//!
//! Uses a fixed hypothetical property so the settings screen can show how a
//! weight change moves the score. The authoritative score is computed by the
//! scoring service, not here.

use crate::types::{
    LayerContribution, LayerKey, MetricKey, ScoreBreakdown, WeightKey, WeightSet, WEIGHT_TOTAL,
};

/// Raw layer scores of the sample property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleScores {
    pub property_fundamentals: u32,
    pub market_intelligence: u32,
    pub deal_comps: u32,
}

impl Default for SampleScores {
    fn default() -> Self {
        Self {
            property_fundamentals: 72,
            market_intelligence: 65,
            deal_comps: 81,
        }
    }
}

impl SampleScores {
    pub fn get(&self, layer: LayerKey) -> u32 {
        match layer {
            LayerKey::PropertyFundamentals => self.property_fundamentals,
            LayerKey::MarketIntelligence => self.market_intelligence,
            LayerKey::DealComps => self.deal_comps,
        }
    }
}

/// Per-metric bias coefficients, in hundredths of a point per weight percent.
const METRIC_BIAS: [(MetricKey, i64); 3] = [
    (MetricKey::CapRate, 2),
    (MetricKey::PricePerUnit, -1),
    (MetricKey::Occupancy, 1),
];

const HUNDREDTHS: i64 = WEIGHT_TOTAL as i64;

fn metric_bias_hundredths(metrics: &WeightSet<MetricKey>) -> i64 {
    METRIC_BIAS
        .iter()
        .map(|&(key, coeff)| metrics.get(key) as i64 * coeff)
        .sum()
}

pub fn metric_bias(metrics: &WeightSet<MetricKey>) -> f64 {
    metric_bias_hundredths(metrics) as f64 / HUNDREDTHS as f64
}

/// Everything is summed in hundredths of a point so half-points round up
/// exactly; the float fields are views of the same integers.
pub fn preview_breakdown_with(
    sample: &SampleScores,
    layers: &WeightSet<LayerKey>,
    metrics: &WeightSet<MetricKey>,
) -> ScoreBreakdown {
    let mut total_hundredths = 0i64;
    let contributions: Vec<LayerContribution> = LayerKey::ALL
        .iter()
        .map(|&layer| {
            let raw_score = sample.get(layer);
            let weight = layers.get(layer);
            let hundredths = raw_score as i64 * weight as i64;
            total_hundredths += hundredths;
            LayerContribution {
                layer,
                raw_score: raw_score as f64,
                weight,
                contribution: hundredths as f64 / HUNDREDTHS as f64,
            }
        })
        .collect();

    let bias_hundredths = metric_bias_hundredths(metrics);
    let score = (total_hundredths + bias_hundredths + HUNDREDTHS / 2)
        .div_euclid(HUNDREDTHS)
        .clamp(0, HUNDREDTHS) as u8;

    ScoreBreakdown {
        layers: contributions,
        weighted_total: total_hundredths as f64 / HUNDREDTHS as f64,
        bias: bias_hundredths as f64 / HUNDREDTHS as f64,
        score,
    }
}

pub fn preview_breakdown(
    layers: &WeightSet<LayerKey>,
    metrics: &WeightSet<MetricKey>,
) -> ScoreBreakdown {
    preview_breakdown_with(&SampleScores::default(), layers, metrics)
}

pub fn compute_preview_score(layers: &WeightSet<LayerKey>, metrics: &WeightSet<MetricKey>) -> u8 {
    preview_breakdown(layers, metrics).score
}
