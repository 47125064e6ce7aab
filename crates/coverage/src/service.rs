use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::image::RenderedImage;
use crate::query::RenderQuery;

/// Default service endpoint, matching the development deployment.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where and how to reach the render service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ServiceConfig {
    /// Reads overrides from `COVERAGE_URL` and `COVERAGE_TIMEOUT_MS`,
    /// falling back to the defaults.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("COVERAGE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout = std::env::var("COVERAGE_TIMEOUT_MS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TIMEOUT);
        Self { base_url, timeout }
    }
}

/// Error type for image fetches.
#[derive(Debug)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    Client(reqwest::Error),
    /// Transport-level failure: connect, deadline, or read.
    Transport(reqwest::Error),
    /// The service answered with a non-success status.
    Status(reqwest::StatusCode),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Client(e) => write!(f, "failed to build http client: {e}"),
            FetchError::Transport(e) => write!(f, "request failed: {e}"),
            FetchError::Status(status) => write!(f, "service answered {status}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Client(e) | FetchError::Transport(e) => Some(e),
            FetchError::Status(_) => None,
        }
    }
}

/// Client for the remote render service.
#[derive(Debug, Clone)]
pub struct CoverageService {
    base_url: String,
    client: reqwest::Client,
}

impl CoverageService {
    pub fn new(config: ServiceConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            base_url: trim_trailing_slashes(config.base_url),
            client,
        })
    }

    pub fn url_for(&self, query: &RenderQuery) -> String {
        format!("{}{}", self.base_url, query.as_str())
    }

    /// Fetches one rendered image.
    ///
    /// Failures surface as [`FetchError`]; the caller decides what the
    /// previous display state becomes.
    pub async fn fetch_image(&self, query: &RenderQuery) -> Result<RenderedImage, FetchError> {
        let url = self.url_for(query);
        debug!(%url, "fetching rendered image");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status()));
        }

        let bytes = resp.bytes().await.map_err(FetchError::Transport)?;
        Ok(RenderedImage::new(bytes))
    }
}

fn trim_trailing_slashes(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
