use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use dealscore_lib::{LayerKey, MetricKey, WeightSet};

#[derive(Debug, Parser)]
#[command(
    name = "dealscore",
    version,
    about = "Adjust deal scoring weights, match presets and preview composite scores"
)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log progress to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Preview the composite score for a weight profile
    Preview {
        /// Layer weights: `30,20,50` or `deal_comps=50,...`
        #[arg(long)]
        layers: Option<WeightSet<LayerKey>>,
        /// Metric weights: `35,30,35` or `cap_rate=35,...`
        #[arg(long)]
        metrics: Option<WeightSet<MetricKey>>,
        /// Fail (exit 1) when the preview score is below this value
        #[arg(long, default_value_t = 0)]
        min_score: u32,
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Change one weight and rebalance the rest of its group
    Adjust {
        #[arg(long, value_enum)]
        group: WeightGroup,
        /// Key within the group, e.g. `property_fundamentals` or `cap_rate`
        #[arg(long)]
        key: String,
        /// New value; clamped to 0..=100
        #[arg(long, allow_hyphen_values = true)]
        value: i64,
        #[arg(long)]
        layers: Option<WeightSet<LayerKey>>,
        #[arg(long)]
        metrics: Option<WeightSet<MetricKey>>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List presets and show which one the weights match
    Presets {
        #[arg(long)]
        layers: Option<WeightSet<LayerKey>>,
        #[arg(long)]
        metrics: Option<WeightSet<MetricKey>>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Apply a preset locally, or on the scoring service with --remote
    ApplyPreset {
        name: String,
        #[arg(long)]
        remote: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Load saved weights and presets from the scoring service
    Pull {
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Save a weight profile to the scoring service
    Push {
        #[arg(long)]
        layers: Option<WeightSet<LayerKey>>,
        #[arg(long)]
        metrics: Option<WeightSet<MetricKey>>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WeightGroup {
    Layer,
    Metric,
}

impl WeightGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            WeightGroup::Layer => "layer",
            WeightGroup::Metric => "metric",
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_weight_lists_into_sets() {
        let cli = Cli::try_parse_from([
            "dealscore",
            "preview",
            "--layers",
            "30,20,50",
            "--metrics",
            "cap_rate=40,price_per_unit=30,occupancy=30",
        ])
        .unwrap();
        match cli.command {
            Commands::Preview {
                layers, metrics, ..
            } => {
                assert_eq!(layers.unwrap().get(LayerKey::DealComps), 50);
                assert_eq!(metrics.unwrap().get(MetricKey::CapRate), 40);
            }
            other => panic!("expected preview, got {other:?}"),
        }
    }

    #[test]
    fn rejects_weight_lists_that_do_not_sum_to_100() {
        let err = Cli::try_parse_from(["dealscore", "preview", "--layers", "30,20,10"]).unwrap_err();
        assert!(err.to_string().contains("sum to 100"));
    }

    #[test]
    fn rejects_weight_lists_that_repeat_a_key() {
        let err = Cli::try_parse_from([
            "dealscore",
            "preview",
            "--metrics",
            "cap_rate=99,price_per_unit=30,occupancy=35,cap_rate=35",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("`cap_rate` is given more than once"));
    }

    #[test]
    fn adjust_accepts_negative_values_for_clamping() {
        let cli = Cli::try_parse_from([
            "dealscore",
            "adjust",
            "--group",
            "layer",
            "--key",
            "deal_comps",
            "--value",
            "-5",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Adjust { value: -5, .. }));
    }
}
