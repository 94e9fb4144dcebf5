//! In-memory weight state for one editing session.
//!
//! Every transition either applies completely or leaves the store untouched,
//! so callers never observe a group that does not sum to 100.

use tracing::debug;

use crate::error::WeightError;
use crate::presets::{match_preset, PresetTable};
use crate::redistribute::redistribute;
use crate::scoring::preview_breakdown;
use crate::types::{LayerKey, MetricKey, ScoreBreakdown, WeightProfile, WeightSet};

#[derive(Debug, Clone)]
pub struct WeightStore {
    presets: PresetTable,
    current: WeightProfile,
    saved: WeightProfile,
    active_preset: Option<String>,
}

impl Default for WeightStore {
    fn default() -> Self {
        Self::new(PresetTable::builtin(), WeightProfile::default())
    }
}

impl WeightStore {
    pub fn new(presets: PresetTable, initial: WeightProfile) -> Self {
        let mut store = Self {
            presets,
            current: initial.clone(),
            saved: initial,
            active_preset: None,
        };
        store.refresh_preset();
        store
    }

    /// Replace both groups and the saved snapshot.
    pub fn load(&mut self, profile: WeightProfile) {
        debug!(layers = %profile.layers, metrics = %profile.metrics, "loading weights");
        self.saved = profile.clone();
        self.current = profile;
        self.refresh_preset();
    }

    pub fn set_layer_weight(&mut self, key: LayerKey, value: u32) -> Result<(), WeightError> {
        let layers = redistribute(&self.current.layers, key, value)?;
        debug!(%key, value, result = %layers, "layer weight changed");
        self.current.layers = layers;
        self.refresh_preset();
        Ok(())
    }

    pub fn set_metric_weight(&mut self, key: MetricKey, value: u32) -> Result<(), WeightError> {
        let metrics = redistribute(&self.current.metrics, key, value)?;
        debug!(%key, value, result = %metrics, "metric weight changed");
        self.current.metrics = metrics;
        self.refresh_preset();
        Ok(())
    }

    /// Overwrite both groups from a preset and treat the result as saved.
    pub fn apply_preset(&mut self, name: &str) -> Result<(), WeightError> {
        let profile = self
            .presets
            .get(name)
            .ok_or_else(|| WeightError::UnknownPreset(name.to_string()))?
            .to_profile()?;
        debug!(preset = name, "applying preset");
        self.load(profile);
        Ok(())
    }

    /// Restore the built-in defaults. The saved snapshot is kept, so this
    /// shows up as an unsaved change unless the defaults were saved.
    pub fn reset(&mut self) {
        self.current = WeightProfile::default();
        self.refresh_preset();
    }

    pub fn has_changes(&self) -> bool {
        self.current != self.saved
    }

    /// Adopt the canonical profile returned after a successful save.
    pub fn mark_saved(&mut self, profile: WeightProfile) {
        self.load(profile);
    }

    /// Swap the preset table, e.g. after fetching it from the service.
    pub fn set_presets(&mut self, presets: PresetTable) {
        self.presets = presets;
        self.refresh_preset();
    }

    pub fn layers(&self) -> &WeightSet<LayerKey> {
        &self.current.layers
    }

    pub fn metrics(&self) -> &WeightSet<MetricKey> {
        &self.current.metrics
    }

    pub fn profile(&self) -> &WeightProfile {
        &self.current
    }

    pub fn saved(&self) -> &WeightProfile {
        &self.saved
    }

    pub fn presets(&self) -> &PresetTable {
        &self.presets
    }

    pub fn active_preset(&self) -> Option<&str> {
        self.active_preset.as_deref()
    }

    pub fn preview(&self) -> ScoreBreakdown {
        preview_breakdown(&self.current.layers, &self.current.metrics)
    }

    fn refresh_preset(&mut self) {
        self.active_preset =
            match_preset(&self.current.layers, &self.current.metrics, &self.presets)
                .map(str::to_string);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_defaults_without_changes() {
        let store = WeightStore::default();
        assert!(!store.has_changes());
        assert_eq!(store.active_preset(), Some("value_add"));
        assert_eq!(store.preview().score, 76);
    }

    #[test]
    fn slider_change_redistributes_and_drops_preset() {
        let mut store = WeightStore::default();
        store
            .set_layer_weight(LayerKey::PropertyFundamentals, 60)
            .unwrap();
        assert_eq!(store.layers().get(LayerKey::MarketIntelligence), 11);
        assert_eq!(store.layers().get(LayerKey::DealComps), 29);
        assert!(store.has_changes());
        assert_eq!(store.active_preset(), None);
    }

    #[test]
    fn moving_back_to_a_preset_reselects_it() {
        let mut store = WeightStore::default();
        store.set_metric_weight(MetricKey::PricePerUnit, 100).unwrap();
        assert_eq!(store.metrics().get(MetricKey::CapRate), 0);
        assert_eq!(store.active_preset(), None);

        // Both other metrics are zero, so 70 splits evenly back to 35/35.
        store.set_metric_weight(MetricKey::PricePerUnit, 30).unwrap();
        assert_eq!(store.metrics(), &WeightSet::<MetricKey>::default());
        assert_eq!(store.active_preset(), Some("value_add"));
        assert!(!store.has_changes());
    }

    #[test]
    fn apply_preset_overwrites_both_groups_and_clears_changes() {
        let mut store = WeightStore::default();
        store.set_layer_weight(LayerKey::DealComps, 10).unwrap();
        assert!(store.has_changes());

        store.apply_preset("opportunistic").unwrap();
        assert!(!store.has_changes());
        assert_eq!(store.active_preset(), Some("opportunistic"));
        assert_eq!(store.layers().get(LayerKey::MarketIntelligence), 45);
        assert_eq!(store.metrics().get(MetricKey::PricePerUnit), 55);
    }

    #[test]
    fn failed_transitions_leave_state_untouched() {
        let mut store = WeightStore::default();
        let before = store.profile().clone();

        assert!(store.set_layer_weight(LayerKey::DealComps, 150).is_err());
        assert_eq!(
            store.apply_preset("growth"),
            Err(WeightError::UnknownPreset("growth".into()))
        );
        assert_eq!(store.profile(), &before);
        assert!(!store.has_changes());
    }

    #[test]
    fn reset_restores_defaults_against_saved_snapshot() {
        let mut store = WeightStore::default();
        store.apply_preset("core").unwrap();
        store.reset();
        assert_eq!(store.profile(), &WeightProfile::default());
        assert!(store.has_changes(), "saved snapshot is still the core preset");
        assert_eq!(store.active_preset(), Some("value_add"));
    }

    #[test]
    fn mark_saved_adopts_canonical_profile() {
        let mut store = WeightStore::default();
        store.set_metric_weight(MetricKey::Occupancy, 40).unwrap();
        let canonical = store.profile().clone();
        store.mark_saved(canonical.clone());
        assert!(!store.has_changes());
        assert_eq!(store.saved(), &canonical);
    }
}
