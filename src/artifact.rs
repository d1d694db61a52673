//! Artifact resolution
//!
//! A release carries many assets; the catalog only advertises the one whose
//! name follows the project's packaging convention for that version.

use crate::error::{Error, Result};
use crate::types::Asset;
use crate::version::build_number;

/// The asset selected for a version
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedArtifact {
    /// Asset filename
    pub name: String,
    /// Direct download URL
    pub download_url: String,
    /// Declared size, if the release listed one
    pub size: Option<u64>,
}

/// Artifact filename template
///
/// `{version}` is replaced with the dotted version and `{build}` with the
/// version's digits (`venera-ios-{version}+{build}.ipa` becomes
/// `venera-ios-1.4.5+145.ipa`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactTemplate {
    template: String,
}

impl ArtifactTemplate {
    /// Create a template from its pattern string
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// The filename expected for `version`
    pub fn file_name(&self, version: &str) -> String {
        self.template
            .replace("{version}", version)
            .replace("{build}", &build_number(version))
    }

    /// Find the asset matching this template for `version`
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArtifactNotFound`] if no asset name matches exactly.
    pub fn resolve(&self, assets: &[Asset], version: &str) -> Result<ResolvedArtifact> {
        let expected = self.file_name(version);
        assets
            .iter()
            .find(|asset| asset.name == expected)
            .map(|asset| ResolvedArtifact {
                name: asset.name.clone(),
                download_url: asset.browser_download_url.clone(),
                size: asset.size,
            })
            .ok_or(Error::ArtifactNotFound {
                expected,
                available: assets.len(),
            })
    }
}
