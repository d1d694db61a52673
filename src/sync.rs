//! Sync orchestration
//!
//! [`CatalogSync`] runs one at-most-once pass: load the catalog, fetch the
//! latest release, derive the version, artifact and description, reconcile,
//! and write the catalog back. The first failing stage aborts the run;
//! retrying is left to whatever schedules the job.

use crate::artifact::ArtifactTemplate;
use crate::config::Config;
use crate::error::{Result, Stage, StageError};
use crate::github::ReleaseClient;
use crate::normalize::normalize;
use crate::reconcile::{NewsSettings, ReconcileOutcome, ReleaseUpdate, reconcile};
use crate::store::{load_catalog, save_catalog};
use crate::types::Catalog;
use crate::version::extract_version;
use tracing::{debug, info};

/// Result of a successful run
#[derive(Clone, Debug, PartialEq)]
pub struct SyncReport {
    /// Repository the release was read from
    pub repository: String,
    /// Tag of the published release
    pub tag: String,
    /// Version written into the catalog
    pub version: String,
    /// Artifact filename
    pub artifact: String,
    /// Artifact size recorded in the catalog
    pub size: u64,
    /// What reconciliation did
    pub outcome: ReconcileOutcome,
    /// Whether the catalog file was written (false for dry runs)
    pub written: bool,
    /// The reconciled catalog
    pub catalog: Catalog,
}

/// One configured catalog sync job
pub struct CatalogSync {
    config: Config,
    client: ReleaseClient,
    template: ArtifactTemplate,
    dry_run: bool,
}

impl CatalogSync {
    /// Validate the configuration and build the HTTP client
    ///
    /// # Errors
    ///
    /// Returns the validation or client construction error.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let client = ReleaseClient::from_config(&config)?;
        let template = ArtifactTemplate::new(config.artifact.name_template.clone());
        Ok(Self {
            config,
            client,
            template,
            dry_run: false,
        })
    }

    /// Skip the final write; the reconciled catalog is still returned
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// The configuration this job runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the sync once
    ///
    /// # Errors
    ///
    /// Returns a [`StageError`] naming the stage that failed. Nothing is
    /// written unless every stage before the save succeeded.
    pub async fn run(&self) -> std::result::Result<SyncReport, StageError> {
        let catalog_path = &self.config.catalog.path;
        let repository = self.config.source.active_repository();
        info!(
            repository,
            channel = ?self.config.source.channel,
            catalog = %catalog_path.display(),
            "Starting catalog sync"
        );

        let mut catalog =
            load_catalog(catalog_path).map_err(|e| StageError::new(Stage::Load, e))?;

        let release = self
            .client
            .fetch_latest_release(repository)
            .await
            .map_err(|e| StageError::new(Stage::Fetch, e))?;

        let description = normalize(release.body.as_deref().unwrap_or_default());

        let version = extract_version(&release.tag_name)
            .map_err(|e| StageError::new(Stage::Version, e))?;
        debug!(tag = %release.tag_name, version = %version, "Extracted version");

        let artifact = self
            .template
            .resolve(&release.assets, &version)
            .map_err(|e| StageError::new(Stage::Artifact, e))?;
        let size = match artifact.size {
            Some(size) => size,
            None => self.client.resolve_asset_size(&artifact.download_url).await,
        };
        debug!(artifact = %artifact.name, size, "Resolved artifact");

        let release_url = release.html_url.clone().unwrap_or_else(|| {
            format!(
                "https://github.com/{}/releases/tag/{}",
                repository, release.tag_name
            )
        });

        let update = ReleaseUpdate {
            tag: release.tag_name.clone(),
            version: version.clone(),
            published_at: release.published_at,
            description,
            download_url: artifact.download_url.clone(),
            size,
            release_url,
        };
        let news = NewsSettings::from(&self.config.catalog);
        let outcome = reconcile(&mut catalog, &update, &news)
            .map_err(|e| StageError::new(Stage::Reconcile, e))?;

        info!(
            version = %version,
            replaced_existing = outcome.replaced_existing,
            news_added = outcome.news_added,
            changed = outcome.changed,
            "Reconciled catalog"
        );

        if self.dry_run {
            info!("Dry run, catalog not written");
        } else {
            save_catalog(catalog_path, &catalog).map_err(|e| StageError::new(Stage::Save, e))?;
            info!(catalog = %catalog_path.display(), "Catalog updated");
        }

        Ok(SyncReport {
            repository: repository.to_string(),
            tag: release.tag_name,
            version,
            artifact: artifact.name,
            size,
            outcome,
            written: !self.dry_run,
            catalog,
        })
    }
}
