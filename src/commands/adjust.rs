use std::path::PathBuf;
use std::process::ExitCode;

use dealscore_lib::output::DEALSCORE_OUTPUT_VERSION;
use dealscore_lib::{
    clamp_percent, AdjustOutput, DealScoreError, DealScoreOutput, LayerKey, MetricKey,
    PresetTable, WeightSet, WeightStore,
};
use tracing::debug;

use crate::cli::{OutputFormat, WeightGroup};
use crate::formatting::{render_error, write_output};
use crate::settings::{load_config, resolve_profile};

/// Run the adjust command.
#[allow(clippy::too_many_arguments)]
pub fn run_adjust(
    config_path: Option<PathBuf>,
    group: WeightGroup,
    key: String,
    value: i64,
    layers: Option<WeightSet<LayerKey>>,
    metrics: Option<WeightSet<MetricKey>>,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output.clone()),
    };
    let profile = resolve_profile(layers, metrics, &config);
    let mut store = WeightStore::new(PresetTable::builtin(), profile);
    let previous = store.profile().clone();

    // Slider semantics: out-of-range input is clamped here, before the engine.
    let value = clamp_percent(value) as u32;
    let applied = match group {
        WeightGroup::Layer => key
            .parse::<LayerKey>()
            .and_then(|k| store.set_layer_weight(k, value)),
        WeightGroup::Metric => key
            .parse::<MetricKey>()
            .and_then(|k| store.set_metric_weight(k, value)),
    };
    if let Err(err) = applied {
        return render_error(DealScoreError::Weights(err), format, output);
    }
    debug!(group = group.as_str(), key = %key, value, "weight adjusted");

    let body = DealScoreOutput::Adjust(AdjustOutput {
        version: DEALSCORE_OUTPUT_VERSION.to_string(),
        group: group.as_str().to_string(),
        key,
        value,
        previous,
        weights: store.profile().clone(),
        preset: store.active_preset().map(str::to_string),
        has_changes: store.has_changes(),
        score: store.preview().score,
    });
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(DealScoreError::Io(err), format, output);
    }
    ExitCode::SUCCESS
}
