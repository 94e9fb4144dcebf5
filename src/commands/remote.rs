use std::path::PathBuf;
use std::process::ExitCode;

use dealscore_lib::output::DEALSCORE_OUTPUT_VERSION;
use dealscore_lib::sync::{apply_remote_preset, pull, push, refresh_presets};
use dealscore_lib::{
    Config, DealScoreError, DealScoreOutput, HttpWeightsClient, LayerKey, MetricKey, PresetTable,
    SyncAction, SyncOutput, WeightSet, WeightStore,
};
use tracing::info;

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::settings::{load_config, resolve_profile};

fn client_for(config: &Config) -> Result<HttpWeightsClient, DealScoreError> {
    let client = HttpWeightsClient::new(&config.api)?;
    info!(base_url = %client.base_url(), "using scoring service");
    Ok(client)
}

fn sync_output(
    action: SyncAction,
    endpoint: Option<String>,
    store: &WeightStore,
    preset: Option<String>,
) -> DealScoreOutput {
    DealScoreOutput::Sync(SyncOutput {
        version: DEALSCORE_OUTPUT_VERSION.to_string(),
        action,
        endpoint,
        weights: store.profile().clone(),
        preset: preset.or_else(|| store.active_preset().map(str::to_string)),
        has_changes: store.has_changes(),
    })
}

fn finish(body: DealScoreOutput, format: OutputFormat, output: Option<PathBuf>) -> ExitCode {
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(DealScoreError::Io(err), format, output);
    }
    ExitCode::SUCCESS
}

/// Run the pull command: presets first, so the active preset is matched
/// against the service's table.
pub async fn run_pull(
    config_path: Option<PathBuf>,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output.clone()),
    };
    let client = match client_for(&config) {
        Ok(c) => c,
        Err(err) => return render_error(err, format, output.clone()),
    };
    let mut store = WeightStore::new(PresetTable::builtin(), config.weights.clone());

    if let Err(err) = refresh_presets(&mut store, &client).await {
        return render_error(err, format, output.clone());
    }
    let saved = match pull(&mut store, &client).await {
        Ok(saved) => saved,
        Err(err) => return render_error(err, format, output.clone()),
    };

    let body = sync_output(
        SyncAction::Pull,
        Some(client.base_url().to_string()),
        &store,
        saved.preset,
    );
    finish(body, format, output)
}

/// Run the push command.
pub async fn run_push(
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
    let client = match client_for(&config) {
        Ok(c) => c,
        Err(err) => return render_error(err, format, output.clone()),
    };
    let profile = resolve_profile(layers, metrics, &config);
    let mut store = WeightStore::new(PresetTable::builtin(), profile);

    let saved = match push(&mut store, &client).await {
        Ok(saved) => saved,
        Err(err) => return render_error(err, format, output.clone()),
    };

    let body = sync_output(
        SyncAction::Push,
        Some(client.base_url().to_string()),
        &store,
        saved.preset,
    );
    finish(body, format, output)
}

/// Run the apply-preset command, locally or against the service.
pub async fn run_apply_preset(
    config_path: Option<PathBuf>,
    name: String,
    remote: bool,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output.clone()),
    };
    let mut store = WeightStore::new(PresetTable::builtin(), config.weights.clone());

    if !remote {
        if let Err(err) = store.apply_preset(&name) {
            return render_error(DealScoreError::Weights(err), format, output);
        }
        let body = sync_output(SyncAction::ApplyPreset, None, &store, None);
        return finish(body, format, output);
    }

    let client = match client_for(&config) {
        Ok(c) => c,
        Err(err) => return render_error(err, format, output.clone()),
    };
    let saved = match apply_remote_preset(&mut store, &client, &name).await {
        Ok(saved) => saved,
        Err(err) => return render_error(err, format, output.clone()),
    };
    let body = sync_output(
        SyncAction::ApplyPreset,
        Some(client.base_url().to_string()),
        &store,
        saved.preset.or(Some(name)),
    );
    finish(body, format, output)
}
