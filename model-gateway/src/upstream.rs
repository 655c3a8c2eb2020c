//! Outbound HTTP to the model providers.

use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use reqwest::{header::CONTENT_TYPE, Client, Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Longest slice of an upstream error body kept in error messages.
const MAX_ERROR_BODY: usize = 512;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request failed with status code {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed upstream response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("cannot build upstream URL from {0:?}")]
    InvalidUrl(String),
}

/// Append `segments` to `base` as percent-encoded path segments. Empty and dot segments are
/// refused, they would point the request at a different resource.
pub fn endpoint_url<I>(base: &str, segments: I) -> Result<String, UpstreamError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut url = Url::parse(base).map_err(|_| UpstreamError::InvalidUrl(base.to_owned()))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| UpstreamError::InvalidUrl(base.to_owned()))?;
        path.pop_if_empty();
        for segment in segments {
            let segment = segment.as_ref();
            if matches!(segment, "" | "." | "..") {
                return Err(UpstreamError::InvalidUrl(segment.to_owned()));
            }
            path.push(segment);
        }
    }
    Ok(url.into())
}

/// A single outbound call. Headers are `(name, value)` pairs, the body is sent as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<Value>,
}

impl UpstreamRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: vec![("Content-Type", "application/json".to_owned())],
            body: Some(body),
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Successful (2xx) upstream response, body untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn json(value: &Value) -> Self {
        Self {
            content_type: Some("application/json".to_owned()),
            body: Bytes::from(value.to_string()),
        }
    }

    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, UpstreamError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Upstream is the seam between the core and the network. Every unit of work issues exactly one
/// [Upstream::send]; non-2xx statuses come back as [UpstreamError::Status].
#[async_trait]
pub trait Upstream {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError>;
}

pub type UpstreamHandle = std::sync::Arc<dyn Upstream + Send + Sync>;

/// [Upstream] backed by a shared reqwest connection pool.
#[derive(Clone, Default)]
pub struct HttpUpstream {
    client: Client,
}

impl HttpUpstream {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        debug!("{} {}", request.method, request.url);

        let mut builder = self.client.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: truncate(&String::from_utf8_lossy(&body), MAX_ERROR_BODY),
            });
        }

        Ok(UpstreamResponse { content_type, body })
    }
}

fn truncate(input: &str, max_len: usize) -> String {
    if input.len() <= max_len {
        return input.to_owned();
    }
    let mut end = max_len;
    while !input.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &input[..end])
}
