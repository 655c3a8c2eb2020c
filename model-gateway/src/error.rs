//! Error taxonomy shared by the dispatcher, the comparator and the demo resolver.

use thiserror::Error;

use crate::{api_types::Metric, upstream::UpstreamError};

#[derive(Error, Debug)]
pub enum GatewayError {
    /// The provider tag is not one of the known providers.
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// The credential needed for the selected provider is not configured.
    #[error("{provider} API key not configured (set {env_var})")]
    MissingCredential {
        provider: &'static str,
        env_var: &'static str,
    },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(
        "Invalid metrics: {}. Valid metrics are: {}",
        .0.join(", "),
        Metric::valid_names().join(", ")
    )]
    InvalidMetrics(Vec<String>),
}

impl GatewayError {
    /// Caller errors are rejected before any upstream dispatch happens.
    pub fn is_request_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_) | Self::InvalidMetrics(_))
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
