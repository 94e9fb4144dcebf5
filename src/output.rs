//! Versioned JSON envelopes written by the CLI.

use serde::{Deserialize, Serialize};

use crate::error::ErrorPayload;
use crate::presets::PresetDef;
use crate::types::{ScoreBreakdown, WeightProfile};

pub const DEALSCORE_OUTPUT_VERSION: &str = "1";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DealScoreOutput {
    Preview(PreviewOutput),
    Adjust(AdjustOutput),
    Presets(PresetsOutput),
    Sync(SyncOutput),
    Error(ErrorOutput),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewOutput {
    pub version: String,
    pub weights: WeightProfile,
    /// Matching preset name; absent for a custom configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    pub breakdown: ScoreBreakdown,
    pub min_score: u32,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustOutput {
    pub version: String,
    /// Which group was changed ("layer" / "metric")
    pub group: String,
    pub key: String,
    /// Value after the caller-side clamp
    pub value: u32,
    pub previous: WeightProfile,
    pub weights: WeightProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    pub has_changes: bool,
    pub score: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetsOutput {
    pub version: String,
    pub presets: Vec<PresetDef>,
    /// Preset matching the evaluated weights, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,
    pub weights: WeightProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    Pull,
    Push,
    ApplyPreset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutput {
    pub version: String,
    pub action: SyncAction,
    /// Base URL of the scoring service; absent for local-only actions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub weights: WeightProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    pub has_changes: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub error: ErrorPayload,
}
