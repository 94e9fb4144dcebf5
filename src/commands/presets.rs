use std::path::PathBuf;
use std::process::ExitCode;

use dealscore_lib::output::DEALSCORE_OUTPUT_VERSION;
use dealscore_lib::{
    match_preset, DealScoreError, DealScoreOutput, LayerKey, MetricKey, PresetTable,
    PresetsOutput, WeightSet,
};

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::settings::{load_config, resolve_profile};

/// Run the presets command.
pub fn run_presets(
    config_path: Option<PathBuf>,
    layers: Option<WeightSet<LayerKey>>,
    metrics: Option<WeightSet<MetricKey>>,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output.clone()),
    };
    let weights = resolve_profile(layers, metrics, &config);
    let table = PresetTable::builtin();
    let active = match_preset(&weights.layers, &weights.metrics, &table).map(str::to_string);

    let body = DealScoreOutput::Presets(PresetsOutput {
        version: DEALSCORE_OUTPUT_VERSION.to_string(),
        presets: table.iter().cloned().collect(),
        active,
        weights,
    });
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(DealScoreError::Io(err), format, output);
    }
    ExitCode::SUCCESS
}
