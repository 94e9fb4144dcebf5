//! Client for the scoring service that persists weights and publishes presets.
//!
//! Endpoints (relative to `api.base_url`):
//! - `GET weights` - saved weights and the preset they came from, if any
//! - `PUT weights` - save a full profile, returns the canonical saved version
//! - `GET presets` - the preset table, in display order
//! - `POST presets/{name}/apply` - apply a preset server-side

use std::future::Future;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::config::ApiConfig;
use crate::error::{DealScoreError, Result};
use crate::presets::PresetTable;
use crate::types::{LayerKey, MetricKey, WeightProfile, WeightSet};

const USER_AGENT: &str = concat!("dealscore/", env!("CARGO_PKG_VERSION"));

/// Weights as stored by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedWeights {
    pub layer_weights: WeightSet<LayerKey>,
    pub metric_weights: WeightSet<MetricKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
}

impl SavedWeights {
    pub fn profile(&self) -> WeightProfile {
        WeightProfile::new(self.layer_weights.clone(), self.metric_weights.clone())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveWeightsRequest<'a> {
    layer_weights: &'a WeightSet<LayerKey>,
    metric_weights: &'a WeightSet<MetricKey>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "detail", alias = "error")]
    message: String,
}

/// Persistence operations the store can be synced against.
pub trait WeightsBackend {
    fn fetch_weights(&self) -> impl Future<Output = Result<SavedWeights>> + Send;

    fn save_weights(
        &self,
        profile: &WeightProfile,
    ) -> impl Future<Output = Result<SavedWeights>> + Send;

    fn fetch_presets(&self) -> impl Future<Output = Result<PresetTable>> + Send;

    fn apply_preset(&self, name: &str) -> impl Future<Output = Result<SavedWeights>> + Send;
}

/// `reqwest`-based implementation of [`WeightsBackend`].
#[derive(Debug, Clone)]
pub struct HttpWeightsClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpWeightsClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url()?,
            token: config.resolved_token(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                DealScoreError::config(format!("api.base_url cannot be a base: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "scoring api request");
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).trim().to_string());
            warn!(%status, %message, "scoring api request failed");
            return Err(DealScoreError::api(Some(status), message));
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

impl WeightsBackend for HttpWeightsClient {
    async fn fetch_weights(&self) -> Result<SavedWeights> {
        let url = self.endpoint(&["weights"])?;
        self.send_json(self.request(Method::GET, url)).await
    }

    async fn save_weights(&self, profile: &WeightProfile) -> Result<SavedWeights> {
        let url = self.endpoint(&["weights"])?;
        let body = SaveWeightsRequest {
            layer_weights: &profile.layers,
            metric_weights: &profile.metrics,
        };
        self.send_json(self.request(Method::PUT, url).json(&body))
            .await
    }

    async fn fetch_presets(&self) -> Result<PresetTable> {
        let url = self.endpoint(&["presets"])?;
        let table: PresetTable = self.send_json(self.request(Method::GET, url)).await?;
        // Re-validate: deserialization alone does not check preset sums.
        Ok(PresetTable::new(table.iter().cloned().collect())?)
    }

    async fn apply_preset(&self, name: &str) -> Result<SavedWeights> {
        let url = self.endpoint(&["presets", name, "apply"])?;
        self.send_json(self.request(Method::POST, url)).await
    }
}
