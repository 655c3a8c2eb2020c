//! Inference Dispatcher: one request in, one upstream call out, the upstream body returned as is.

use std::iter;

use log::{info, warn};
use serde_json::{json, Map, Value};

use crate::{
    api_types::{InferenceRequest, Modality},
    config::{Credentials, Endpoints},
    error::Result,
    provider::Provider,
    upstream::{endpoint_url, UpstreamError, UpstreamHandle, UpstreamRequest, UpstreamResponse},
};

const STABILITY_TEXT_TO_IMAGE: &str =
    "/v1/generation/stable-diffusion-xl-1024-v1-0/text-to-image";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Upstream body for a successful inference, passed through byte-for-byte.
pub type InferenceResult = UpstreamResponse;

pub struct InferenceDispatcher {
    credentials: Credentials,
    endpoints: Endpoints,
    upstream: UpstreamHandle,
}

impl InferenceDispatcher {
    pub fn new(credentials: Credentials, endpoints: Endpoints, upstream: UpstreamHandle) -> Self {
        Self {
            credentials,
            endpoints,
            upstream,
        }
    }

    pub async fn run_inference(&self, request: InferenceRequest) -> Result<InferenceResult> {
        let provider: Provider = request.provider.parse()?;
        let api_key = self.credentials.require(provider)?;
        let upstream_request = self.build_request(provider, api_key, request)?;

        info!(
            "Dispatching inference provider={} endpoint={}",
            provider, &upstream_request.url
        );

        match self.upstream.send(upstream_request).await {
            Ok(response) => Ok(response),
            Err(err) => {
                warn!("Inference against {} failed: {}", provider, err);
                Err(err.into())
            }
        }
    }

    /// Shape the provider specific request. The credential must already be resolved.
    fn build_request(
        &self,
        provider: Provider,
        api_key: &str,
        request: InferenceRequest,
    ) -> std::result::Result<UpstreamRequest, UpstreamError> {
        let InferenceRequest {
            model_id,
            input,
            modality,
            ..
        } = request;
        let endpoints = &self.endpoints;

        let request = match provider {
            Provider::HuggingFace => UpstreamRequest::post_json(
                endpoint_url(
                    &endpoints.huggingface_inference_base(),
                    iter::once("models").chain(model_id.split('/')),
                )?,
                Value::Object(input),
            )
            .header("Authorization", format!("Bearer {}", api_key)),

            Provider::Replicate => UpstreamRequest::post_json(
                format!("{}/v1/predictions", endpoints.replicate_base_url),
                json!({ "version": model_id, "input": input }),
            )
            .header("Authorization", format!("Token {}", api_key)),

            Provider::Stability => UpstreamRequest::post_json(
                format!("{}{}", endpoints.stability_base_url, STABILITY_TEXT_TO_IMAGE),
                Value::Object(input),
            )
            .header("Authorization", format!("Bearer {}", api_key)),

            Provider::OpenAi => UpstreamRequest::post_json(
                format!("{}{}", endpoints.openai_base_url, openai_path(modality)),
                with_model(model_id, input),
            )
            .header("Authorization", format!("Bearer {}", api_key)),

            Provider::Claude => UpstreamRequest::post_json(
                format!("{}/v1/messages", endpoints.anthropic_base_url),
                with_model(model_id, input),
            )
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION),

            Provider::Gemini => UpstreamRequest::post_json(
                endpoint_url(
                    &endpoints.gemini_base_url,
                    ["v1beta", "models", format!("{}:generateContent", model_id).as_str()],
                )?,
                Value::Object(input),
            )
            .header("x-goog-api-key", api_key),
        };
        Ok(request)
    }
}

/// OpenAI multiplexes model families over several REST paths.
fn openai_path(modality: Option<Modality>) -> &'static str {
    match modality {
        Some(Modality::Image) => "/v1/images/generations",
        Some(Modality::Audio) => "/v1/audio/transcriptions",
        _ => "/v1/chat/completions",
    }
}

/// `{ model, ...input }`: keys from `input` win, including a `model` key.
fn with_model(model_id: String, input: Map<String, Value>) -> Value {
    let mut body = Map::new();
    body.insert("model".to_owned(), Value::String(model_id));
    body.extend(input);
    Value::Object(body)
}
