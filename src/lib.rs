pub mod api;
pub mod config;
pub mod error;
pub mod output;
pub mod presets;
pub mod redistribute;
pub mod scoring;
pub mod store;
pub mod sync;
pub mod types;

pub use api::{HttpWeightsClient, SavedWeights, WeightsBackend};
pub use config::{ApiConfig, Config};
pub use error::{DealScoreError, ErrorCategory, ErrorPayload, Result, WeightError};
pub use output::{
    AdjustOutput, DealScoreOutput, ErrorOutput, PresetsOutput, PreviewOutput, SyncAction,
    SyncOutput,
};
pub use presets::{match_preset, PresetDef, PresetTable};
pub use redistribute::redistribute;
pub use scoring::{compute_preview_score, preview_breakdown, SampleScores};
pub use store::WeightStore;
pub use types::{
    clamp_percent, LayerContribution, LayerKey, MetricKey, ScoreBreakdown, WeightKey,
    WeightProfile, WeightSet,
};
