//! Named weight presets and preset matching.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::WeightError;
use crate::types::weights::fraction_to_percent;
use crate::types::{LayerKey, MetricKey, WeightKey, WeightProfile, WeightSet};

/// A named investment strategy. Weights are stored as fractions (0.0 - 1.0)
/// the way the scoring service publishes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetDef {
    pub name: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub layer_weights: BTreeMap<LayerKey, f64>,
    pub metric_weights: BTreeMap<MetricKey, f64>,
}

impl PresetDef {
    fn builtin(
        name: &str,
        label: &str,
        description: &str,
        layers: [f64; 3],
        metrics: [f64; 3],
    ) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            description: Some(description.to_string()),
            layer_weights: LayerKey::ALL.iter().copied().zip(layers).collect(),
            metric_weights: MetricKey::ALL.iter().copied().zip(metrics).collect(),
        }
    }

    /// Percentage profile this preset applies.
    pub fn to_profile(&self) -> Result<WeightProfile, WeightError> {
        let bad = |e: WeightError| WeightError::BadPreset {
            name: self.name.clone(),
            reason: e.to_string(),
        };
        Ok(WeightProfile {
            layers: WeightSet::from_fractions(&self.layer_weights).map_err(bad)?,
            metrics: WeightSet::from_fractions(&self.metric_weights).map_err(bad)?,
        })
    }

    /// True when every fraction is a whole percentage equal to the current
    /// weight for that key.
    pub fn matches(&self, layers: &WeightSet<LayerKey>, metrics: &WeightSet<MetricKey>) -> bool {
        group_matches(&self.layer_weights, layers) && group_matches(&self.metric_weights, metrics)
    }
}

fn group_matches<K: WeightKey>(fractions: &BTreeMap<K, f64>, current: &WeightSet<K>) -> bool {
    K::ALL.iter().all(|&key| {
        fractions
            .get(&key)
            .is_some_and(|&f| fraction_to_percent(f) == Some(current.get(key) as u32))
    })
}

/// Presets in insertion order. Lookups and matching always walk that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetTable {
    presets: Vec<PresetDef>,
}

impl PresetTable {
    pub fn new(presets: Vec<PresetDef>) -> Result<Self, WeightError> {
        for preset in &presets {
            preset.to_profile()?;
        }
        Ok(Self { presets })
    }

    pub fn builtin() -> Self {
        Self {
            presets: vec![
                PresetDef::builtin(
                    "value_add",
                    "Value-Add",
                    "Balanced fundamentals with heavy weight on comparable deals.",
                    [0.30, 0.20, 0.50],
                    [0.35, 0.30, 0.35],
                ),
                PresetDef::builtin(
                    "cash_flow",
                    "Cash Flow",
                    "Favors in-place income: cap rate and occupancy dominate.",
                    [0.50, 0.20, 0.30],
                    [0.50, 0.15, 0.35],
                ),
                PresetDef::builtin(
                    "core",
                    "Core",
                    "Stabilized assets in strong markets.",
                    [0.40, 0.35, 0.25],
                    [0.30, 0.25, 0.45],
                ),
                PresetDef::builtin(
                    "opportunistic",
                    "Opportunistic",
                    "Market momentum and pricing upside over current income.",
                    [0.20, 0.45, 0.35],
                    [0.20, 0.55, 0.25],
                ),
            ],
        }
    }

    pub fn get(&self, name: &str) -> Option<&PresetDef> {
        self.presets.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PresetDef> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

impl Default for PresetTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Name of the first preset equal to the current weights, or `None` for a
/// custom configuration.
///
/// Equality is exact on whole percentages. Fractions such as 0.07 only
/// differ from 7% by binary representation and match; a fraction that is not
/// a whole percentage (0.304) never matches, and `PresetTable::new` rejects
/// it up front.
pub fn match_preset<'a>(
    layers: &WeightSet<LayerKey>,
    metrics: &WeightSet<MetricKey>,
    presets: &'a PresetTable,
) -> Option<&'a str> {
    presets
        .iter()
        .find(|p| p.matches(layers, metrics))
        .map(|p| p.name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(layers: [u32; 3], metrics: [u32; 3]) -> WeightProfile {
        WeightProfile::new(
            WeightSet::from_ordered(&layers).unwrap(),
            WeightSet::from_ordered(&metrics).unwrap(),
        )
    }

    #[test]
    fn builtin_presets_are_valid_profiles() {
        let table = PresetTable::builtin();
        assert_eq!(table.len(), 4);
        for preset in table.iter() {
            let p = preset.to_profile().expect("builtin preset converts");
            assert_eq!(p.layers.sum(), 100, "{}", preset.name);
            assert_eq!(p.metrics.sum(), 100, "{}", preset.name);
        }
    }

    #[test]
    fn defaults_match_value_add() {
        let table = PresetTable::builtin();
        let p = WeightProfile::default();
        assert_eq!(match_preset(&p.layers, &p.metrics, &table), Some("value_add"));
    }

    #[test]
    fn metric_fractions_must_match_as_well() {
        let table = PresetTable::builtin();
        let p = profile([30, 20, 50], [35, 31, 34]);
        assert_eq!(match_preset(&p.layers, &p.metrics, &table), None);
    }

    #[test]
    fn every_builtin_matches_its_own_profile() {
        let table = PresetTable::builtin();
        for preset in table.iter() {
            let p = preset.to_profile().unwrap();
            assert_eq!(
                match_preset(&p.layers, &p.metrics, &table),
                Some(preset.name.as_str())
            );
        }
    }

    #[test]
    fn first_match_wins_in_insertion_order() {
        let mut twin = PresetTable::builtin().get("core").unwrap().clone();
        twin.name = "core_twin".into();
        let table = PresetTable::new(vec![
            twin,
            PresetTable::builtin().get("core").unwrap().clone(),
        ])
        .unwrap();
        let p = profile([40, 35, 25], [30, 25, 45]);
        assert_eq!(match_preset(&p.layers, &p.metrics, &table), Some("core_twin"));
    }

    #[test]
    fn partial_preset_never_matches_and_fails_validation() {
        let mut preset = PresetTable::builtin().get("core").unwrap().clone();
        preset.metric_weights.remove(&MetricKey::Occupancy);
        let p = profile([40, 35, 25], [30, 25, 45]);
        assert!(!preset.matches(&p.layers, &p.metrics));
        assert!(matches!(
            PresetTable::new(vec![preset]),
            Err(WeightError::BadPreset { .. })
        ));
    }

    #[test]
    fn fractional_percentages_never_match_and_are_rejected() {
        let mut preset = PresetTable::builtin().get("value_add").unwrap().clone();
        preset.name = "almost_value_add".into();
        preset.layer_weights.insert(LayerKey::PropertyFundamentals, 0.304);
        preset.layer_weights.insert(LayerKey::DealComps, 0.496);
        let p = WeightProfile::default();
        assert!(!preset.matches(&p.layers, &p.metrics));
        assert!(matches!(
            PresetTable::new(vec![preset]),
            Err(WeightError::BadPreset { ref name, .. }) if name == "almost_value_add"
        ));
    }

    #[test]
    fn matching_is_deterministic() {
        let table = PresetTable::builtin();
        let p = profile([50, 20, 30], [50, 15, 35]);
        let first = match_preset(&p.layers, &p.metrics, &table);
        for _ in 0..10 {
            assert_eq!(match_preset(&p.layers, &p.metrics, &table), first);
        }
        assert_eq!(first, Some("cash_flow"));
    }

    #[test]
    fn preset_table_round_trips_as_json_array() {
        let table = PresetTable::builtin();
        let json = serde_json::to_value(&table).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["layerWeights"]["deal_comps"], 0.5);
        let back: PresetTable = serde_json::from_value(json).unwrap();
        let names: Vec<&str> = back.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["value_add", "cash_flow", "core", "opportunistic"]);
    }
}
