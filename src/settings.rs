use std::path::Path;

use dealscore_lib::{Config, DealScoreError, LayerKey, MetricKey, WeightProfile, WeightSet};
use tracing_subscriber::EnvFilter;

/// Built-in defaults when no `--config` is given; a given file must parse and
/// validate.
pub fn load_config(path: Option<&Path>) -> Result<Config, DealScoreError> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let config = Config::from_toml_file(path).map_err(|e| {
        DealScoreError::config(format!("Failed to read config {}: {e}", path.display()))
    })?;
    config
        .validate()
        .map_err(|e| DealScoreError::config(format!("Invalid config {}: {e}", path.display())))?;
    Ok(config)
}

pub fn flag_present(args: &[String], flag: &str) -> bool {
    args.iter()
        .any(|arg| arg == flag || arg.starts_with(&format!("{flag}=")))
}

/// CLI weight groups win over the config; each group resolves on its own.
pub fn resolve_profile(
    layers: Option<WeightSet<LayerKey>>,
    metrics: Option<WeightSet<MetricKey>>,
    config: &Config,
) -> WeightProfile {
    WeightProfile::new(
        layers.unwrap_or_else(|| config.weights.layers.clone()),
        metrics.unwrap_or_else(|| config.weights.metrics.clone()),
    )
}

pub fn resolve_min_score(raw_args: &[String], cli_min_score: u32, config: &Config) -> u32 {
    if flag_present(raw_args, "--min-score") {
        cli_min_score
    } else {
        config.min_score
    }
}

/// Logs go to stderr so JSON on stdout stays machine-readable.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "dealscore=debug,dealscore_lib=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flag_present_matches_bare_and_assignment_forms() {
        assert!(flag_present(&args(&["dealscore", "--min-score", "5"]), "--min-score"));
        assert!(flag_present(&args(&["dealscore", "--min-score=5"]), "--min-score"));
        assert!(!flag_present(&args(&["dealscore", "--min"]), "--min-score"));
    }

    #[test]
    fn min_score_prefers_config_when_flag_absent() {
        let cfg = Config {
            min_score: 80,
            ..Config::default()
        };
        assert_eq!(resolve_min_score(&args(&["dealscore"]), 0, &cfg), 80);
        assert_eq!(
            resolve_min_score(&args(&["dealscore", "--min-score", "10"]), 10, &cfg),
            10
        );
    }

    #[test]
    fn profile_groups_resolve_independently() {
        let mut cfg = Config::default();
        cfg.weights.metrics = WeightSet::from_ordered(&[50, 15, 35]).unwrap();
        let layers = WeightSet::from_ordered(&[60, 11, 29]).unwrap();

        let profile = resolve_profile(Some(layers.clone()), None, &cfg);
        assert_eq!(profile.layers, layers);
        assert_eq!(profile.metrics.get(MetricKey::CapRate), 50);
    }

    #[test]
    fn load_config_reports_missing_file() {
        let err = load_config(Some(Path::new("/nonexistent/dealscore.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn load_config_validates_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("dealscore.toml");
        std::fs::write(&path, "min_score = 150\n").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Invalid config"));
    }
}
