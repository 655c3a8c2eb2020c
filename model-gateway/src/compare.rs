//! Metadata Comparator: resolve metadata per model and project it onto the requested metrics.

use std::collections::HashSet;

use futures::future::join_all;
use log::{info, warn};
use serde::Deserialize;

use crate::{
    api_types::{Capabilities, CompareRequest, ComparisonRow, Cost, Metric, ModelMetadata},
    catalog,
    config::{Credentials, Endpoints},
    error::{GatewayError, Result},
    provider::{ModelFamily, Provider},
    upstream::{endpoint_url, UpstreamError, UpstreamHandle, UpstreamRequest},
};

/// The subset of the hub's `/api/models/{id}` response that feeds the comparison.
#[derive(Deserialize, Debug)]
struct HubModelInfo {
    #[serde(default)]
    pipeline_tag: Option<String>,
    #[serde(default)]
    downloads: Option<u64>,
    #[serde(default)]
    likes: Option<u64>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

impl From<HubModelInfo> for ModelMetadata {
    fn from(info: HubModelInfo) -> Self {
        let pipeline = info.pipeline_tag.as_deref();
        let tags = info.tags.unwrap_or_default();
        Self {
            capabilities: Capabilities {
                text: pipeline == Some("text-generation"),
                image: pipeline == Some("image-generation"),
                audio: pipeline == Some("audio-to-text"),
                video: false,
                multimodal: tags.iter().any(|t| t == "multimodal"),
            },
            modality: info.pipeline_tag.unwrap_or_else(|| "unknown".to_owned()),
            latency: info.downloads.unwrap_or(0),
            popularity: info.likes.unwrap_or(0),
            // Hosted open models are free.
            cost: Cost::default(),
        }
    }
}

impl CompareRequest {
    /// Request-shape validation, run before any metadata is resolved. Returns the parsed metric
    /// set in request order.
    pub fn validate(&self) -> Result<Vec<Metric>> {
        if self.models.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "models must be a non-empty array".to_owned(),
            ));
        }
        if self.metrics.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "metrics must be a non-empty array".to_owned(),
            ));
        }

        let (metrics, invalid): (Vec<_>, Vec<_>) = self
            .metrics
            .iter()
            .map(|name| name.parse::<Metric>())
            .partition(|parsed| parsed.is_ok());
        if !invalid.is_empty() {
            return Err(GatewayError::InvalidMetrics(
                invalid.into_iter().filter_map(|m| m.err()).collect(),
            ));
        }

        Ok(metrics.into_iter().filter_map(|m| m.ok()).collect())
    }
}

/// Keep `id` plus exactly the requested fields.
pub fn project(id: &str, metadata: ModelMetadata, metrics: &HashSet<Metric>) -> ComparisonRow {
    let ModelMetadata {
        modality,
        latency,
        popularity,
        cost,
        capabilities,
    } = metadata;

    ComparisonRow {
        id: id.to_owned(),
        modality: metrics.contains(&Metric::Modality).then_some(modality),
        latency: metrics.contains(&Metric::Latency).then_some(latency),
        popularity: metrics.contains(&Metric::Popularity).then_some(popularity),
        cost: metrics.contains(&Metric::Cost).then_some(cost),
        capabilities: metrics
            .contains(&Metric::Capabilities)
            .then_some(capabilities),
    }
}

pub struct MetadataComparator {
    credentials: Credentials,
    endpoints: Endpoints,
    upstream: UpstreamHandle,
}

impl MetadataComparator {
    pub fn new(credentials: Credentials, endpoints: Endpoints, upstream: UpstreamHandle) -> Self {
        Self {
            credentials,
            endpoints,
            upstream,
        }
    }

    /// One row per requested model, in request order. Lookups run concurrently and a failed
    /// lookup only defaults its own row.
    pub async fn compare_models(&self, request: &CompareRequest) -> Result<Vec<ComparisonRow>> {
        let metrics: HashSet<Metric> = request.validate()?.into_iter().collect();
        info!(
            "Comparing {} model(s) on {} metric(s)",
            request.models.len(),
            metrics.len()
        );

        let resolved = join_all(
            request
                .models
                .iter()
                .map(|model_id| self.resolve_metadata(model_id)),
        )
        .await;

        Ok(request
            .models
            .iter()
            .zip(resolved)
            .map(|(model_id, metadata)| project(model_id, metadata, &metrics))
            .collect())
    }

    /// Never fails: any lookup error is logged and replaced by [ModelMetadata::default].
    pub async fn resolve_metadata(&self, model_id: &str) -> ModelMetadata {
        let family = ModelFamily::detect(model_id);
        if let Some(metadata) = catalog::lookup(family, model_id) {
            return metadata;
        }

        match self.fetch_hub_metadata(model_id).await {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!("Error fetching metadata for model {}: {}", model_id, err);
                ModelMetadata::default()
            }
        }
    }

    async fn fetch_hub_metadata(
        &self,
        model_id: &str,
    ) -> std::result::Result<ModelMetadata, UpstreamError> {
        let url = endpoint_url(
            &self.endpoints.huggingface_hub_base(),
            ["api", "models"].into_iter().chain(model_id.split('/')),
        )?;
        let mut request = UpstreamRequest::get(url);
        if let Some(key) = self.credentials.get(Provider::HuggingFace) {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let info: HubModelInfo = self.upstream.send(request).await?.parse()?;
        Ok(info.into())
    }
}
