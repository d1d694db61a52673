//! Test configuration helpers: temporary catalogs and configs pointing at a mock API

use altstore_sync::Config;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

/// Write `content` as the catalog in a fresh temporary directory
///
/// The directory must be kept alive for as long as the catalog is used.
pub fn write_catalog(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("alt_store.json");
    std::fs::write(&path, content).expect("Failed to write catalog");
    (temp_dir, path)
}

/// Configuration that reads releases from `api_base_url` and updates `catalog`
pub fn test_config(api_base_url: &str, catalog: PathBuf) -> Config {
    let mut config = Config::default();
    config.source.api_base_url = api_base_url.to_string();
    config.catalog.path = catalog;
    config.http.timeout = Duration::from_secs(5);
    config.artifact.fallback_size = 194_586;
    config
}
