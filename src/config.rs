//! TOML configuration.
//!
//! ```toml
//! min_score = 70
//!
//! [api]
//! base_url = "http://localhost:8000/api/"
//! timeout = "10s"
//!
//! [weights.layers]
//! property_fundamentals = 30
//! market_intelligence = 20
//! deal_comps = 50
//!
//! [weights.metrics]
//! cap_rate = 35
//! price_per_unit = 30
//! occupancy = 35
//! ```
//!
//! Every section is optional; missing values fall back to the defaults below.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DealScoreError, Result};
use crate::types::{WeightProfile, WEIGHT_TOTAL};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/";
pub const API_TOKEN_ENV: &str = "DEALSCORE_API_TOKEN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Preview scores below this fail the `preview` command.
    pub min_score: u32,
    pub api: ApiConfig,
    /// Initial profile used when nothing is loaded from the service.
    pub weights: WeightProfile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_score: 0,
            api: ApiConfig::default(),
            weights: WeightProfile::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            token: None,
        }
    }
}

impl ApiConfig {
    /// Base URL with a trailing slash so relative joins keep the path prefix.
    pub fn base_url(&self) -> Result<Url> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Ok(Url::parse(&raw)?)
    }

    /// Token from the config file, falling back to the environment.
    pub fn resolved_token(&self) -> Option<String> {
        pick_token(self.token.as_deref(), std::env::var(API_TOKEN_ENV).ok())
    }
}

/// Blank tokens count as unset at either source.
fn pick_token(configured: Option<&str>, from_env: Option<String>) -> Option<String> {
    let present = |t: &str| !t.trim().is_empty();
    configured
        .filter(|t| present(t))
        .map(str::to_string)
        .or_else(|| from_env.filter(|t| present(t)))
}

impl Config {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| DealScoreError::Config(e.to_string()))
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_score > WEIGHT_TOTAL {
            return Err(DealScoreError::Config(format!(
                "min_score must be within 0..=100, got {}",
                self.min_score
            )));
        }
        let url = self.api.base_url()?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DealScoreError::Config(format!(
                "api.base_url must be http(s), got {}",
                url.scheme()
            )));
        }
        if self.api.timeout.is_zero() {
            return Err(DealScoreError::Config(
                "api.timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LayerKey, MetricKey};

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = Config::from_toml_str("").unwrap();
        assert_eq!(cfg, Config::default());
        cfg.validate().unwrap();
    }

    #[test]
    fn parses_all_sections() {
        let cfg = Config::from_toml_str(
            r#"
min_score = 70
[api]
base_url = "https://scoring.example.com/api"
timeout = "3s"
[weights.layers]
property_fundamentals = 50
market_intelligence = 20
deal_comps = 30
[weights.metrics]
cap_rate = 50
price_per_unit = 15
occupancy = 35
"#,
        )
        .unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.min_score, 70);
        assert_eq!(cfg.api.timeout, Duration::from_secs(3));
        assert_eq!(
            cfg.api.base_url().unwrap().as_str(),
            "https://scoring.example.com/api/"
        );
        assert_eq!(cfg.weights.layers.get(LayerKey::PropertyFundamentals), 50);
        assert_eq!(cfg.weights.metrics.get(MetricKey::PricePerUnit), 15);
    }

    #[test]
    fn weights_that_do_not_sum_to_100_are_rejected() {
        let err = Config::from_toml_str(
            r#"
[weights.layers]
property_fundamentals = 50
market_intelligence = 50
deal_comps = 50
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("sum to 100"), "{err}");
    }

    #[test]
    fn configured_token_wins_and_blank_tokens_are_ignored() {
        assert_eq!(
            pick_token(Some("from-config"), Some("from-env".into())).as_deref(),
            Some("from-config")
        );
        assert_eq!(
            pick_token(None, Some("from-env".into())).as_deref(),
            Some("from-env")
        );
        assert_eq!(
            pick_token(Some("   "), Some("from-env".into())).as_deref(),
            Some("from-env")
        );
        assert_eq!(pick_token(Some(""), Some(" \t".into())), None);
        assert_eq!(pick_token(None, None), None);
    }

    #[test]
    fn resolved_token_reads_environment_fallback() {
        // Only test in the crate that touches this variable.
        std::env::set_var(API_TOKEN_ENV, "env-token");
        let from_env = ApiConfig::default().resolved_token();
        let configured = ApiConfig {
            token: Some("file-token".into()),
            ..ApiConfig::default()
        }
        .resolved_token();
        std::env::set_var(API_TOKEN_ENV, "  ");
        let blank = ApiConfig::default().resolved_token();
        std::env::remove_var(API_TOKEN_ENV);

        assert_eq!(from_env.as_deref(), Some("env-token"));
        assert_eq!(configured.as_deref(), Some("file-token"));
        assert_eq!(blank, None);
    }

    #[test]
    fn token_is_read_from_toml_but_never_written_back() {
        let cfg = Config::from_toml_str("[api]\ntoken = \"secret\"\n").unwrap();
        assert_eq!(cfg.api.token.as_deref(), Some("secret"));
        let written = toml::to_string(&cfg).unwrap();
        assert!(!written.contains("secret"));
    }

    #[test]
    fn validate_rejects_bad_threshold_and_scheme() {
        let cfg = Config {
            min_score: 101,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.api.base_url = "ftp://example.com".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("http"));
    }
}
