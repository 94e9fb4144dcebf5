//! Moving weights between a [`WeightStore`] and the scoring service.
//!
//! The store is only written after the service answered successfully, so a
//! failed call leaves the local edit in place for another attempt.

use tracing::{info, warn};

use crate::api::{SavedWeights, WeightsBackend};
use crate::error::Result;
use crate::store::WeightStore;

/// Load the saved weights into the store.
pub async fn pull<B: WeightsBackend>(store: &mut WeightStore, backend: &B) -> Result<SavedWeights> {
    let saved = backend
        .fetch_weights()
        .await
        .inspect_err(|e| warn!(error = %e, "failed to load weights"))?;
    store.load(saved.profile());
    info!(preset = ?saved.preset, "loaded saved weights");
    Ok(saved)
}

/// Save the current profile and adopt the service's canonical copy.
pub async fn push<B: WeightsBackend>(store: &mut WeightStore, backend: &B) -> Result<SavedWeights> {
    let saved = backend
        .save_weights(store.profile())
        .await
        .inspect_err(|e| warn!(error = %e, "failed to save weights"))?;
    store.mark_saved(saved.profile());
    info!(preset = ?saved.preset, "saved weights");
    Ok(saved)
}

/// Apply a preset server-side and load the resulting weights.
pub async fn apply_remote_preset<B: WeightsBackend>(
    store: &mut WeightStore,
    backend: &B,
    name: &str,
) -> Result<SavedWeights> {
    let saved = backend
        .apply_preset(name)
        .await
        .inspect_err(|e| warn!(error = %e, preset = name, "failed to apply preset"))?;
    store.load(saved.profile());
    info!(preset = name, "applied preset");
    Ok(saved)
}

/// Replace the store's preset table with the one the service publishes.
pub async fn refresh_presets<B: WeightsBackend>(store: &mut WeightStore, backend: &B) -> Result<()> {
    let table = backend
        .fetch_presets()
        .await
        .inspect_err(|e| warn!(error = %e, "failed to load presets"))?;
    info!(count = table.len(), "loaded presets");
    store.set_presets(table);
    Ok(())
}
