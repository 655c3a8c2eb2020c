use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::error::GatewayError;

/// Upstream model providers the gateway knows how to talk to.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    #[serde(rename = "huggingface")]
    HuggingFace,

    #[serde(rename = "replicate")]
    Replicate,

    #[serde(rename = "stability")]
    Stability,

    #[serde(rename = "openai")]
    OpenAi,

    #[serde(rename = "claude")]
    Claude,

    #[serde(rename = "gemini")]
    Gemini,
}

impl Provider {
    pub const ALL: [Provider; 6] = [
        Provider::HuggingFace,
        Provider::Replicate,
        Provider::Stability,
        Provider::OpenAi,
        Provider::Claude,
        Provider::Gemini,
    ];

    /// Tag used on the wire, e.g. in request bodies.
    pub fn tag(&self) -> &'static str {
        match self {
            Provider::HuggingFace => "huggingface",
            Provider::Replicate => "replicate",
            Provider::Stability => "stability",
            Provider::OpenAi => "openai",
            Provider::Claude => "claude",
            Provider::Gemini => "gemini",
        }
    }

    /// Human readable vendor name, used in error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::HuggingFace => "HuggingFace",
            Provider::Replicate => "Replicate",
            Provider::Stability => "Stability",
            Provider::OpenAi => "OpenAI",
            Provider::Claude => "Anthropic",
            Provider::Gemini => "Google",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn credential_env_var(&self) -> &'static str {
        match self {
            Provider::HuggingFace => "HUGGINGFACE_API_KEY",
            Provider::Replicate => "REPLICATE_API_KEY",
            Provider::Stability => "STABILITY_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Claude => "ANTHROPIC_API_KEY",
            Provider::Gemini => "GOOGLE_API_KEY",
        }
    }

    pub fn valid_tags() -> Vec<&'static str> {
        Self::ALL.iter().map(Provider::tag).collect()
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Provider {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|provider| provider.tag() == s)
            .ok_or_else(|| GatewayError::UnsupportedProvider(s.to_owned()))
    }
}

/// Source of a model's comparison metadata. Only huggingface models are looked up live, the
/// vendor families are served from the static catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    HuggingFace,
    OpenAi,
    Claude,
    Gemini,
}

impl ModelFamily {
    /// Infer the family from the lexical shape of a model id. Anything unrecognized is treated
    /// as a huggingface hub model.
    pub fn detect(model_id: &str) -> Self {
        if model_id.starts_with("gpt-") || model_id.starts_with("text-") {
            ModelFamily::OpenAi
        } else if model_id.starts_with("claude-") {
            ModelFamily::Claude
        } else if model_id.starts_with("gemini-") {
            ModelFamily::Gemini
        } else {
            ModelFamily::HuggingFace
        }
    }
}
