//! Error types for altstore-sync
//!
//! Every failure in a sync run is fatal. This module provides:
//! - The [`Error`] taxonomy, one variant per failure class
//! - [`Stage`] identification so the binary can say *where* a run failed
//! - Machine-readable error codes and process exit codes

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for altstore-sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for altstore-sync
///
/// Each variant carries enough context to produce a useful diagnostic on its own.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "source.repository")
        key: Option<String>,
    },

    /// The release feed could not be fetched (transport failure, bad status, invalid body)
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The release feed contained no usable release
    #[error("no release available: {0}")]
    NoRelease(String),

    /// The release tag does not contain a dotted `MAJOR.MINOR.PATCH` version
    #[error("could not parse a version from tag {tag:?}")]
    UnparsableVersion {
        /// The tag that was searched
        tag: String,
    },

    /// None of the release assets matches the expected artifact name
    #[error("artifact {expected:?} not found among {available} release assets")]
    ArtifactNotFound {
        /// The filename the artifact template produced
        expected: String,
        /// How many assets the release carried
        available: usize,
    },

    /// The catalog has no app entries to update
    #[error("catalog contains no apps")]
    EmptyCatalog,

    /// Reading, parsing, serializing, or writing the catalog document failed
    #[error("catalog persistence failed for {}: {reason}", path.display())]
    Persistence {
        /// The catalog path involved
        path: PathBuf,
        /// Why the operation failed
        reason: String,
    },

    /// HTTP client construction or transport error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error outside of catalog persistence (e.g. reading a config file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error outside of catalog persistence
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The stage of a sync run in which an error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Building or validating configuration
    Config,
    /// Reading the catalog document
    Load,
    /// Fetching the release feed
    Fetch,
    /// Extracting the version from the release tag
    Version,
    /// Locating the installable artifact
    Artifact,
    /// Merging the release into the catalog
    Reconcile,
    /// Writing the catalog document
    Save,
}

impl Stage {
    /// Short lowercase name used in diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Config => "config",
            Stage::Load => "load",
            Stage::Fetch => "fetch",
            Stage::Version => "version",
            Stage::Artifact => "artifact",
            Stage::Reconcile => "reconcile",
            Stage::Save => "save",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Create a configuration error for a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Create a persistence error for a catalog path
    pub fn persistence(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        Error::Persistence {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// The stage this error is attributed to
    ///
    /// Persistence errors are reported as `load` here; the orchestrator
    /// re-attributes write failures to [`Stage::Save`] when it reports them.
    pub fn stage(&self) -> Stage {
        match self {
            Error::Config { .. } => Stage::Config,
            Error::Io(_) | Error::Serialization(_) => Stage::Config,
            Error::Upstream(_) | Error::NoRelease(_) | Error::Network(_) => Stage::Fetch,
            Error::UnparsableVersion { .. } => Stage::Version,
            Error::ArtifactNotFound { .. } => Stage::Artifact,
            Error::EmptyCatalog => Stage::Reconcile,
            Error::Persistence { .. } => Stage::Load,
        }
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Upstream(_) => "upstream_error",
            Error::NoRelease(_) => "no_release",
            Error::UnparsableVersion { .. } => "unparsable_version",
            Error::ArtifactNotFound { .. } => "artifact_not_found",
            Error::EmptyCatalog => "empty_catalog",
            Error::Persistence { .. } => "persistence_error",
            Error::Network(_) => "network_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
        }
    }

    /// Process exit status for this error (never zero)
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config { .. } | Error::Io(_) | Error::Serialization(_) => 2,
            Error::Upstream(_) | Error::Network(_) => 3,
            Error::NoRelease(_) => 4,
            Error::UnparsableVersion { .. } => 5,
            Error::ArtifactNotFound { .. } => 6,
            Error::EmptyCatalog => 7,
            Error::Persistence { .. } => 8,
        }
    }
}

/// An error annotated with the stage of the run that produced it
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct StageError {
    /// Where the run stopped
    pub stage: Stage,
    /// What went wrong
    #[source]
    pub source: Error,
}

impl StageError {
    /// Attribute an error to an explicit stage
    pub fn new(stage: Stage, source: Error) -> Self {
        Self { stage, source }
    }
}

impl From<Error> for StageError {
    fn from(source: Error) -> Self {
        Self {
            stage: source.stage(),
            source,
        }
    }
}
