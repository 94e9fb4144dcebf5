use std::path::PathBuf;
use std::process::ExitCode;

use dealscore_lib::output::DEALSCORE_OUTPUT_VERSION;
use dealscore_lib::{
    DealScoreError, DealScoreOutput, LayerKey, MetricKey, PresetTable, PreviewOutput,
    WeightSet, WeightStore,
};
use tracing::debug;

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::settings::{load_config, resolve_min_score, resolve_profile};

/// Run the preview command.
#[allow(clippy::too_many_arguments)]
pub fn run_preview(
    raw_args: &[String],
    config_path: Option<PathBuf>,
    layers: Option<WeightSet<LayerKey>>,
    metrics: Option<WeightSet<MetricKey>>,
    min_score: u32,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output.clone()),
    };
    let min_score = resolve_min_score(raw_args, min_score, &config);
    if min_score > 100 {
        return render_error(
            DealScoreError::Config(format!("--min-score must be within 0..=100, got {min_score}")),
            format,
            output,
        );
    }

    let profile = resolve_profile(layers, metrics, &config);
    debug!(layers = %profile.layers, metrics = %profile.metrics, min_score, "previewing score");
    let store = WeightStore::new(PresetTable::builtin(), profile);
    let breakdown = store.preview();
    let passed = breakdown.score as u32 >= min_score;

    let body = DealScoreOutput::Preview(PreviewOutput {
        version: DEALSCORE_OUTPUT_VERSION.to_string(),
        weights: store.profile().clone(),
        preset: store.active_preset().map(str::to_string),
        breakdown,
        min_score,
        passed,
    });
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(DealScoreError::Io(err), format, output);
    }

    exit_code_for_preview(passed)
}

fn exit_code_for_preview(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
