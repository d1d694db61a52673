//! # altstore-sync
//!
//! Keeps an AltStore source manifest in step with a project's GitHub releases.
//!
//! One run reads the catalog document, fetches the newest release of the
//! configured repository, extracts its version and installable artifact,
//! cleans up the release notes, and merges the result into the catalog:
//! the version history gets the release at index 0 (replacing any entry for
//! the same version), the app's current-version fields follow it, and a news
//! entry is appended once per release tag. The catalog is then replaced
//! atomically.
//!
//! Running the job again for the same release leaves the catalog unchanged.
//!
//! ## Quick Start
//!
//! ```no_run
//! use altstore_sync::{CatalogSync, Config};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.source.repository = "venera-app/venera".to_string();
//!     config.catalog.path = "alt_store.json".into();
//!
//!     let report = CatalogSync::new(config)?.run().await?;
//!     println!("published {} ({})", report.version, report.tag);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Artifact resolution
pub mod artifact;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Release feed client
pub mod github;
/// Release note cleanup
pub mod normalize;
/// Catalog reconciliation
pub mod reconcile;
/// Catalog persistence
pub mod store;
/// Sync orchestration
pub mod sync;
/// Release and catalog types
pub mod types;
/// Version extraction
pub mod version;

// Re-export commonly used types
pub use artifact::{ArtifactTemplate, ResolvedArtifact};
pub use config::{Config, ReleaseChannel};
pub use error::{Error, Result, Stage, StageError};
pub use github::ReleaseClient;
pub use reconcile::{NewsSettings, ReconcileOutcome, ReleaseUpdate, reconcile};
pub use sync::{CatalogSync, SyncReport};
pub use types::{AppSummary, Asset, Catalog, KeyOrder, NewsEntry, Release, VersionEntry};
