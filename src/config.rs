//! Configuration types for altstore-sync
//!
//! Everything a run needs is carried in [`Config`] and handed to the
//! orchestrator explicitly. The environment is consulted in exactly one
//! place, [`ReleaseChannel::detect`], and only when the caller asks for it.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Size in bytes recorded when an asset declares no size and the HEAD probe fails
///
/// Zero means "unknown" to AltStore-compatible clients, which then fall back
/// to the download's own `Content-Length`.
pub const DEFAULT_FALLBACK_SIZE: u64 = 0;

/// Default artifact naming convention (`venera-ios-1.4.5+145.ipa`)
pub const DEFAULT_ARTIFACT_TEMPLATE: &str = "venera-ios-{version}+{build}.ipa";

/// Which release feed a run follows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseChannel {
    /// Regular tagged releases
    #[default]
    Stable,
    /// Nightly builds
    Nightly,
}

impl ReleaseChannel {
    /// Nightly if `env_var` is present in the process environment (its value is ignored)
    pub fn detect(env_var: &str) -> Self {
        if std::env::var_os(env_var).is_some() {
            ReleaseChannel::Nightly
        } else {
            ReleaseChannel::Stable
        }
    }
}

/// Where releases come from
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Repository identifier in `owner/name` form (default: "venera-app/venera")
    #[serde(default = "default_repository")]
    pub repository: String,

    /// Repository followed on the nightly channel (None = same as `repository`)
    #[serde(default)]
    pub nightly_repository: Option<String>,

    /// Base URL of the hosting API (default: "https://api.github.com")
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Channel to follow (default: stable)
    #[serde(default)]
    pub channel: ReleaseChannel,

    /// Environment variable whose presence selects the nightly channel (default: "NIGHTLY_LINK")
    #[serde(default = "default_nightly_env_var")]
    pub nightly_env_var: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            repository: default_repository(),
            nightly_repository: None,
            api_base_url: default_api_base_url(),
            channel: ReleaseChannel::default(),
            nightly_env_var: default_nightly_env_var(),
        }
    }
}

impl SourceConfig {
    /// Repository identifier followed by the configured channel
    pub fn active_repository(&self) -> &str {
        match self.channel {
            ReleaseChannel::Stable => &self.repository,
            ReleaseChannel::Nightly => self
                .nightly_repository
                .as_deref()
                .unwrap_or(&self.repository),
        }
    }
}

/// How the installable artifact is located
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Asset filename template; `{version}` and `{build}` are substituted
    #[serde(default = "default_artifact_template")]
    pub name_template: String,

    /// Size recorded when the size probe fails (default: 0, "unknown")
    #[serde(default = "default_fallback_size")]
    pub fallback_size: u64,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            name_template: default_artifact_template(),
            fallback_size: default_fallback_size(),
        }
    }
}

/// The catalog document and the news entries written into it
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path of the catalog JSON document (default: "alt_store.json")
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,

    /// `appID` written into news entries
    #[serde(default = "default_app_id")]
    pub app_id: String,

    /// Display name used in news titles
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// News caption
    #[serde(default = "default_news_caption")]
    pub news_caption: String,

    /// News tint color
    #[serde(default = "default_tint_color")]
    pub tint_color: String,

    /// Whether news entries request a user notification (default: true)
    #[serde(default = "default_true")]
    pub notify: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
            app_id: default_app_id(),
            app_name: default_app_name(),
            news_caption: default_news_caption(),
            tint_color: default_tint_color(),
            notify: true,
        }
    }
}

/// HTTP client settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Timeout applied to every request, in seconds (default: 30)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// User-Agent header (the GitHub API rejects requests without one)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// API token passed through as a bearer credential, never persisted
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            user_agent: default_user_agent(),
            token: None,
        }
    }
}

/// Main configuration for a sync run
///
/// Every section has defaults matching the Venera iOS source, so an empty
/// JSON object is a valid configuration file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Release feed selection
    #[serde(default)]
    pub source: SourceConfig,

    /// Artifact naming and sizing
    #[serde(default)]
    pub artifact: ArtifactConfig,

    /// Catalog document and news settings
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

impl Config {
    /// Load a configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        serde_json::from_str(&content).map_err(|e| Error::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
            key: None,
        })
    }

    /// Check that the configuration can drive a run
    pub fn validate(&self) -> Result<()> {
        validate_repository("source.repository", &self.source.repository)?;
        if let Some(nightly) = &self.source.nightly_repository {
            validate_repository("source.nightly_repository", nightly)?;
        }

        let base = url::Url::parse(&self.source.api_base_url).map_err(|e| {
            Error::config("source.api_base_url", format!("invalid URL: {e}"))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::config(
                "source.api_base_url",
                "must start with http:// or https://",
            ));
        }

        if !self.artifact.name_template.contains("{version}") {
            return Err(Error::config(
                "artifact.name_template",
                "must contain the {version} placeholder",
            ));
        }

        if self.catalog.app_id.trim().is_empty() {
            return Err(Error::config("catalog.app_id", "must not be empty"));
        }

        if self.http.timeout.is_zero() {
            return Err(Error::config("http.timeout", "must be greater than zero"));
        }

        Ok(())
    }
}

fn validate_repository(key: &str, repository: &str) -> Result<()> {
    match repository.split_once('/') {
        Some((owner, name))
            if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
        {
            Ok(())
        }
        _ => Err(Error::config(
            key,
            format!("expected owner/name, got {repository:?}"),
        )),
    }
}

fn default_repository() -> String {
    "venera-app/venera".to_string()
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_nightly_env_var() -> String {
    "NIGHTLY_LINK".to_string()
}

fn default_artifact_template() -> String {
    DEFAULT_ARTIFACT_TEMPLATE.to_string()
}

fn default_fallback_size() -> u64 {
    DEFAULT_FALLBACK_SIZE
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("alt_store.json")
}

fn default_app_id() -> String {
    "com.github.wgh136.venera".to_string()
}

fn default_app_name() -> String {
    "Venera".to_string()
}

fn default_news_caption() -> String {
    "Update of Venera just got released!".to_string()
}

fn default_tint_color() -> String {
    "#0784FC".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("altstore-sync/", env!("CARGO_PKG_VERSION")).to_string()
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
