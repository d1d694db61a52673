//! Catalog persistence
//!
//! The catalog is read whole and written whole. Writes go to a temporary
//! file next to the target and are renamed over it only once fully flushed,
//! so readers see either the old document or the new one, never a partial.
//! Keys keep the order they had on disk, so an unchanged catalog is written
//! back byte for byte.

use crate::error::{Error, Result};
use crate::types::Catalog;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Read and parse the catalog at `path`
///
/// # Errors
///
/// Returns [`Error::Persistence`] if the file cannot be read or is not a
/// valid catalog document.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let content = fs::read_to_string(path).map_err(|e| Error::persistence(path, e))?;
    let catalog = serde_json::from_str(&content)
        .and_then(Catalog::from_document)
        .map_err(|e| Error::persistence(path, format!("invalid catalog JSON: {e}")))?;
    debug!(
        path = %path.display(),
        apps = catalog.apps.len(),
        news = catalog.news.len(),
        "Loaded catalog"
    );
    Ok(catalog)
}

/// Render the catalog as written to disk (2-space indent, non-ASCII kept as-is)
pub fn render_catalog(catalog: &Catalog) -> Result<String> {
    Ok(serde_json::to_string_pretty(&catalog.to_document()?)?)
}

/// Atomically replace the catalog at `path`
///
/// The document is written to a temporary file in the same directory,
/// flushed to disk, given the original file's permissions, and renamed over
/// `path`. On any failure the temporary file is removed and the original is
/// left untouched.
///
/// # Errors
///
/// Returns [`Error::Persistence`] if any step fails.
pub fn save_catalog(path: &Path, catalog: &Catalog) -> Result<()> {
    let document = catalog
        .to_document()
        .map_err(|e| Error::persistence(path, format!("cannot serialize catalog: {e}")))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::Builder::new()
        .prefix(".altstore-sync-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| Error::persistence(path, format!("cannot create temporary file: {e}")))?;

    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, &document)
            .map_err(|e| Error::persistence(path, format!("cannot serialize catalog: {e}")))?;
        writer
            .flush()
            .map_err(|e| Error::persistence(path, format!("cannot write catalog: {e}")))?;
    }

    temp.as_file()
        .sync_all()
        .map_err(|e| Error::persistence(path, format!("cannot sync catalog: {e}")))?;

    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(|e| Error::persistence(path, format!("cannot copy permissions: {e}")))?;
    }

    temp.persist(path)
        .map_err(|e| Error::persistence(path, format!("cannot replace catalog: {}", e.error)))?;

    debug!(path = %path.display(), "Saved catalog");
    Ok(())
}
