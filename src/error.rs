use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::ParseError;

/// Contract violations raised by the weight core.
///
/// These never come from well-formed input: callers clamp values and pick
/// keys from the closed key enums before reaching the pure functions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeightError {
    #[error("weight {value} for `{key}` is outside 0..=100")]
    OutOfRange { key: &'static str, value: u32 },

    #[error("unknown weight key `{0}`")]
    UnknownKey(String),

    #[error("weight key `{0}` is given more than once")]
    DuplicateKey(&'static str),

    #[error("weight set is missing key `{0}`")]
    MissingKey(&'static str),

    #[error("weights must sum to 100, got {0}")]
    BadSum(u32),

    #[error("expected {expected} {group} weights, got {got}")]
    WrongLength {
        group: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("`{0}` is not an integer percentage")]
    InvalidValue(String),

    #[error("unknown preset `{0}`")]
    UnknownPreset(String),

    #[error("preset `{name}` is invalid: {reason}")]
    BadPreset { name: String, reason: String },
}

#[derive(Debug, Error)]
pub enum DealScoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ParseError),

    #[error("Scoring API error (status: {status:?}): {message}")]
    Api {
        status: Option<StatusCode>,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Weight error: {0}")]
    Weights(#[from] WeightError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl DealScoreError {
    pub fn api(status: Option<StatusCode>, message: impl Into<String>) -> Self {
        DealScoreError::Api {
            status,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        DealScoreError::Config(message.into())
    }

    /// Network and server-side failures can be retried without touching local state.
    pub fn is_retryable(&self) -> bool {
        match self {
            DealScoreError::Network(_) => true,
            DealScoreError::Api { status, .. } => status
                .map(|s| s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS)
                .unwrap_or(true),
            _ => false,
        }
    }

    pub fn to_payload(&self) -> ErrorPayload {
        let payload = match self {
            DealScoreError::Io(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check file paths/permissions.",
            ),
            DealScoreError::Network(e) => ErrorPayload::new(
                ErrorCategory::Network,
                e.to_string(),
                "Check connectivity and api.base_url, then retry; local weights were not changed.",
            ),
            DealScoreError::InvalidUrl(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Verify api.base_url (e.g., http://localhost:8000/api/).",
            ),
            DealScoreError::Api { status, message } => ErrorPayload::new(
                ErrorCategory::Api,
                format!("Scoring API error (status {:?}): {}", status, message),
                "Retry after waiting; check DEALSCORE_API_TOKEN if the status is 401/403.",
            ),
            DealScoreError::Serialization(e) => ErrorPayload::new(
                ErrorCategory::Api,
                e.to_string(),
                "The service returned an unexpected payload; run with --verbose for details.",
            ),
            DealScoreError::Weights(e) => ErrorPayload::new(
                ErrorCategory::Weights,
                e.to_string(),
                "Weights are integer percentages (0-100) per key and each group must sum to 100.",
            ),
            DealScoreError::Config(msg) => ErrorPayload::new(
                ErrorCategory::Config,
                msg.to_string(),
                "Check flags/paths (e.g., --layers 30,20,50) and the config file.",
            ),
            DealScoreError::Unknown(msg) => ErrorPayload::new(
                ErrorCategory::Unknown,
                msg.to_string(),
                "Re-run with --verbose; file an issue if persistent.",
            ),
        };
        payload.with_retryable(self.is_retryable())
    }
}

pub type Result<T> = std::result::Result<T, DealScoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    Network,
    Api,
    Weights,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
    #[serde(default)]
    pub retryable: bool,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
            retryable: false,
        }
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }
}
