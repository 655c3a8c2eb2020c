//! Process configuration. Everything is read from the environment once at startup and handed to
//! the components explicitly.

use std::{fmt, net::Ipv4Addr};

use anyhow::Context;
use serde::Deserialize;

use crate::{error::GatewayError, provider::Provider};

#[derive(Deserialize, Debug, Clone)]
pub struct ServerEnv {
    #[serde(default = "default_listen_addr")]
    pub host: Ipv4Addr,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_listen_addr() -> Ipv4Addr {
    Ipv4Addr::LOCALHOST
}

fn default_port() -> u16 {
    3000
}

/// Provider API keys. Missing keys are not a startup error: a key is only required once a
/// request actually targets its provider.
#[derive(Deserialize, Clone, Default)]
pub struct Credentials {
    #[serde(default)]
    pub huggingface_api_key: Option<String>,
    #[serde(default)]
    pub replicate_api_key: Option<String>,
    #[serde(default)]
    pub stability_api_key: Option<String>,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default)]
    pub google_api_key: Option<String>,
}

impl Credentials {
    /// Key configured for `provider`, if any. Blank values count as unset.
    pub fn get(&self, provider: Provider) -> Option<&str> {
        let key = match provider {
            Provider::HuggingFace => &self.huggingface_api_key,
            Provider::Replicate => &self.replicate_api_key,
            Provider::Stability => &self.stability_api_key,
            Provider::OpenAi => &self.openai_api_key,
            Provider::Claude => &self.anthropic_api_key,
            Provider::Gemini => &self.google_api_key,
        };

        key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn require(&self, provider: Provider) -> Result<&str, GatewayError> {
        self.get(provider)
            .ok_or(GatewayError::MissingCredential {
                provider: provider.display_name(),
                env_var: provider.credential_env_var(),
            })
    }

    pub fn with_key(mut self, provider: Provider, key: impl Into<String>) -> Self {
        let slot = match provider {
            Provider::HuggingFace => &mut self.huggingface_api_key,
            Provider::Replicate => &mut self.replicate_api_key,
            Provider::Stability => &mut self.stability_api_key,
            Provider::OpenAi => &mut self.openai_api_key,
            Provider::Claude => &mut self.anthropic_api_key,
            Provider::Gemini => &mut self.google_api_key,
        };
        *slot = Some(key.into());
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("Credentials");
        for provider in Provider::ALL {
            let state = if self.get(provider).is_some() {
                "<redacted>"
            } else {
                "<unset>"
            };
            dbg.field(provider.tag(), &state);
        }
        dbg.finish()
    }
}

/// Upstream base URLs, overridable with `GATEWAY_`-prefixed variables.
#[derive(Deserialize, Debug, Clone)]
pub struct Endpoints {
    #[serde(default = "default_huggingface_host")]
    pub huggingface_host: String,
    #[serde(default = "default_replicate_base_url")]
    pub replicate_base_url: String,
    #[serde(default = "default_stability_base_url")]
    pub stability_base_url: String,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_anthropic_base_url")]
    pub anthropic_base_url: String,
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,
}

fn default_huggingface_host() -> String {
    String::from("huggingface.co")
}

fn default_replicate_base_url() -> String {
    String::from("https://api.replicate.com")
}

fn default_stability_base_url() -> String {
    String::from("https://api.stability.ai")
}

fn default_openai_base_url() -> String {
    String::from("https://api.openai.com")
}

fn default_anthropic_base_url() -> String {
    String::from("https://api.anthropic.com")
}

fn default_gemini_base_url() -> String {
    String::from("https://generativelanguage.googleapis.com")
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            huggingface_host: default_huggingface_host(),
            replicate_base_url: default_replicate_base_url(),
            stability_base_url: default_stability_base_url(),
            openai_base_url: default_openai_base_url(),
            anthropic_base_url: default_anthropic_base_url(),
            gemini_base_url: default_gemini_base_url(),
        }
    }
}

impl Endpoints {
    fn normalized(mut self) -> Self {
        for url in [
            &mut self.huggingface_host,
            &mut self.replicate_base_url,
            &mut self.stability_base_url,
            &mut self.openai_base_url,
            &mut self.anthropic_base_url,
            &mut self.gemini_base_url,
        ] {
            let trimmed = url.trim().trim_end_matches('/').to_owned();
            *url = trimmed;
        }
        self
    }

    /// Hosted inference API, `https://api-inference.{host}`.
    pub fn huggingface_inference_base(&self) -> String {
        format!("https://api-inference.{}", self.huggingface_host)
    }

    /// Hub API and model pages, `https://{host}`.
    pub fn huggingface_hub_base(&self) -> String {
        format!("https://{}", self.huggingface_host)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    pub credentials: Credentials,
    pub endpoints: Endpoints,
}

impl GatewayConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let credentials =
            envy::from_env::<Credentials>().context("failed to read provider credentials")?;
        let endpoints = envy::prefixed("GATEWAY_")
            .from_env::<Endpoints>()
            .context("failed to read upstream endpoints")?
            .normalized();

        Ok(Self {
            credentials,
            endpoints,
        })
    }
}
