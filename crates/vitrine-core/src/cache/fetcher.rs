//! Network fetch seam for the cache manager
//!
//! The manager only ever talks to the network through the `Fetcher` trait,
//! so tests can count calls and simulate offline conditions. `HttpFetcher`
//! is the real implementation over reqwest.

use crate::cache::types::{AssetRequest, Method, ResponseSnapshot};
use crate::error::FetchError;
use async_trait::async_trait;

/// Performs the actual network request for a cache miss or passthrough.
///
/// Upstream error statuses (404, 500) are returned as snapshots; only
/// transport-level failures map to `FetchError`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &AssetRequest) -> Result<ResponseSnapshot, FetchError>;
}

/// reqwest-backed fetcher
///
/// An optional base URL lets callers use site-relative manifest paths
/// (`/favicon.svg`) against a deployed origin.
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: None,
        }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: Some(base_url.trim_end_matches('/').to_string()),
        }
    }

    fn absolute_url(&self, url: &str) -> String {
        match (&self.base_url, url.starts_with('/')) {
            (Some(base), true) => format!("{}{}", base, url),
            _ => url.to_string(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &AssetRequest) -> Result<ResponseSnapshot, FetchError> {
        let url = self.absolute_url(&request.url);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Patch => reqwest::Method::PATCH,
            Method::Options => reqwest::Method::OPTIONS,
        };

        let response = self
            .client
            .request(method, &url)
            .send()
            .await
            .map_err(|e| FetchError::new(&url, e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::new(&url, e.to_string()))?
            .to_vec();

        Ok(ResponseSnapshot {
            status,
            headers,
            body,
        })
    }
}
