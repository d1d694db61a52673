//! Release feed access
//!
//! Fetches the release list of a repository from the GitHub REST API (or any
//! API-compatible host) and probes asset sizes.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::Release;
use reqwest::header::{ACCEPT, CONTENT_LENGTH};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Media type of the structured JSON release representation
pub const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Client for the hosting API's release endpoints
///
/// Every request goes through one `reqwest::Client` built with an explicit
/// timeout, so neither the list fetch nor the size probe can hang a
/// scheduled run indefinitely.
pub struct ReleaseClient {
    /// HTTP client shared by all requests
    http_client: reqwest::Client,

    /// API root, always ending in `/`
    api_base: Url,

    /// Optional bearer token, passed through untouched
    token: Option<String>,

    /// Size reported when a probe fails
    fallback_size: u64,
}

impl ReleaseClient {
    /// Create a client
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `api_base_url` is not a valid URL, or
    /// [`Error::Network`] if the HTTP client cannot be created.
    pub fn new(
        api_base_url: &str,
        timeout: Duration,
        user_agent: &str,
        token: Option<String>,
        fallback_size: u64,
    ) -> Result<Self> {
        let mut base = api_base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let api_base = Url::parse(&base)
            .map_err(|e| Error::config("source.api_base_url", format!("invalid URL: {e}")))?;

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            http_client,
            api_base,
            token,
            fallback_size,
        })
    }

    /// Create a client from the HTTP, source, and artifact settings of a [`Config`]
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.source.api_base_url,
            config.http.timeout,
            &config.http.user_agent,
            config.http.token.clone(),
            config.artifact.fallback_size,
        )
    }

    /// URL of the release list for `repository` (`owner/name`)
    pub fn releases_url(&self, repository: &str) -> Result<Url> {
        self.api_base
            .join(&format!("repos/{repository}/releases"))
            .map_err(|e| Error::config("source.repository", format!("invalid repository path: {e}")))
    }

    /// Fetch the newest release of `repository`
    ///
    /// The feed is newest-first, so the first element is the latest release.
    /// There is no retry: an unreachable feed fails the run.
    ///
    /// # Errors
    ///
    /// - [`Error::Upstream`] on transport failure, non-success status, or a non-JSON body
    /// - [`Error::NoRelease`] if the body is not a list, is empty, or its first
    ///   element is not a release
    pub async fn fetch_latest_release(&self, repository: &str) -> Result<Release> {
        let url = self.releases_url(repository)?;
        debug!(url = %url, "Fetching release list");

        let mut request = self.http_client.get(url.clone()).header(ACCEPT, GITHUB_MEDIA_TYPE);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("failed to fetch {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream(format!(
                "release feed returned HTTP {}: {}",
                status.as_u16(),
                url
            )));
        }

        let feed: Value = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("release feed is not valid JSON: {e}")))?;

        let release = select_latest(feed)?;
        info!(
            repository,
            tag = %release.tag_name,
            published_at = %release.published_at,
            assets = release.assets.len(),
            "Found latest release"
        );
        Ok(release)
    }

    /// Size of the file at `url` according to a `HEAD` request
    ///
    /// Size is display metadata, so this never fails: any error is logged
    /// and the configured fallback size is returned instead.
    pub async fn resolve_asset_size(&self, url: &str) -> u64 {
        match self.probe_content_length(url).await {
            Ok(size) => {
                debug!(url, size, "Probed asset size");
                size
            }
            Err(e) => {
                warn!(
                    url,
                    error = %e,
                    fallback_size = self.fallback_size,
                    "Asset size probe failed, using fallback size"
                );
                self.fallback_size
            }
        }
    }

    async fn probe_content_length(&self, url: &str) -> Result<u64> {
        let response = self
            .http_client
            .head(url)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("HEAD {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream(format!(
                "HEAD {} returned HTTP {}",
                url,
                status.as_u16()
            )));
        }

        response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .ok_or_else(|| Error::Upstream(format!("HEAD {url} returned no usable Content-Length")))
    }
}

/// Pick the latest release out of a decoded release list
fn select_latest(feed: Value) -> Result<Release> {
    let Value::Array(releases) = feed else {
        return Err(Error::NoRelease("release feed is not a list".to_string()));
    };

    let first = releases
        .into_iter()
        .next()
        .ok_or_else(|| Error::NoRelease("release list is empty".to_string()))?;

    serde_json::from_value(first)
        .map_err(|e| Error::NoRelease(format!("latest release is malformed: {e}")))
}
