//! Demo-URL Resolver. Every live lookup degrades to a canonical URL, so the only failure a caller
//! can see is an unknown provider tag.

use log::{info, warn};
use reqwest::Url;
use serde::Deserialize;

use crate::{
    config::{Credentials, Endpoints},
    error::Result,
    provider::Provider,
    upstream::{endpoint_url, UpstreamError, UpstreamHandle, UpstreamRequest},
};

pub const STABILITY_DOCS_URL: &str = "https://platform.stability.ai/docs/api-reference";
pub const OPENAI_IMAGES_GUIDE_URL: &str = "https://platform.openai.com/docs/guides/images";
pub const CLAUDE_DOCS_URL: &str = "https://docs.anthropic.com/claude/docs/models-overview";
pub const GEMINI_DOCS_URL: &str = "https://ai.google.dev/docs/gemini_api";

/// Image generation model ids routed to the images guide.
const OPENAI_IMAGE_MODEL_PREFIXES: [&str; 2] = ["dall-e", "gpt-image"];

/// The hub lists spaces either by id or as objects, depending on the API version.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum HubSpace {
    Id(String),
    Entry {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        url: Option<String>,
    },
}

#[derive(Deserialize, Debug)]
struct HubModelSpaces {
    #[serde(default)]
    spaces: Vec<HubSpace>,
}

#[derive(Deserialize, Debug)]
struct ReplicateModel {
    #[serde(default)]
    url: Option<String>,
}

pub struct DemoUrlResolver {
    credentials: Credentials,
    endpoints: Endpoints,
    upstream: UpstreamHandle,
}

impl DemoUrlResolver {
    pub fn new(credentials: Credentials, endpoints: Endpoints, upstream: UpstreamHandle) -> Self {
        Self {
            credentials,
            endpoints,
            upstream,
        }
    }

    pub async fn fetch_demo_url(&self, model_id: &str, provider: &str) -> Result<String> {
        let provider: Provider = provider.parse()?;
        let url = match provider {
            Provider::HuggingFace => self.huggingface_demo(model_id).await,
            Provider::Replicate => self.replicate_demo(model_id).await,
            Provider::Stability => STABILITY_DOCS_URL.to_owned(),
            Provider::OpenAi => openai_docs_url(model_id),
            Provider::Claude => CLAUDE_DOCS_URL.to_owned(),
            Provider::Gemini => GEMINI_DOCS_URL.to_owned(),
        };

        info!("Resolved demo for {} model={} url={}", provider, model_id, &url);
        Ok(url)
    }

    async fn huggingface_demo(&self, model_id: &str) -> String {
        let hub = self.endpoints.huggingface_hub_base();
        let fallback = format!("{}/{}", hub, model_id);

        match self.first_space_url(&hub, model_id).await {
            Ok(Some(url)) => url,
            Ok(None) => fallback,
            Err(err) => {
                warn!("Error fetching HuggingFace demo for {}: {}", model_id, err);
                fallback
            }
        }
    }

    async fn first_space_url(
        &self,
        hub: &str,
        model_id: &str,
    ) -> std::result::Result<Option<String>, UpstreamError> {
        let url = endpoint_url(hub, ["api", "models"].into_iter().chain(model_id.split('/')))?;
        let mut request = UpstreamRequest::get(url);
        if let Some(key) = self.credentials.get(Provider::HuggingFace) {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let info: HubModelSpaces = self.upstream.send(request).await?.parse()?;
        let url = info.spaces.into_iter().next().and_then(|space| match space {
            HubSpace::Id(id) | HubSpace::Entry { id: Some(id), url: None } => {
                Some(format!("{}/spaces/{}", hub, id))
            }
            HubSpace::Entry { url: Some(url), .. } => Some(url),
            HubSpace::Entry { id: None, url: None } => None,
        });

        Ok(url.filter(|u| is_absolute_url(u)))
    }

    async fn replicate_demo(&self, model_id: &str) -> String {
        let fallback = format!("https://replicate.com/{}", model_id);

        // Without a key the lookup can only fail, skip straight to the canonical page.
        let Some(key) = self.credentials.get(Provider::Replicate) else {
            return fallback;
        };

        match self.replicate_model_url(key, model_id).await {
            Ok(Some(url)) if is_absolute_url(&url) => url,
            Ok(_) => fallback,
            Err(err) => {
                warn!("Error fetching Replicate demo for {}: {}", model_id, err);
                fallback
            }
        }
    }

    async fn replicate_model_url(
        &self,
        key: &str,
        model_id: &str,
    ) -> std::result::Result<Option<String>, UpstreamError> {
        let url = endpoint_url(
            &self.endpoints.replicate_base_url,
            ["v1", "models"].into_iter().chain(model_id.split('/')),
        )?;
        let request = UpstreamRequest::get(url).header("Authorization", format!("Token {}", key));

        let model: ReplicateModel = self.upstream.send(request).await?.parse()?;
        Ok(model.url)
    }
}

fn openai_docs_url(model_id: &str) -> String {
    if OPENAI_IMAGE_MODEL_PREFIXES
        .iter()
        .any(|prefix| model_id.starts_with(prefix))
    {
        OPENAI_IMAGES_GUIDE_URL.to_owned()
    } else {
        format!("https://platform.openai.com/docs/models/{}", model_id)
    }
}

fn is_absolute_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}
