//! Version extraction from release tags

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

// Pattern is a literal; failure to compile is a programming error
#[allow(clippy::expect_used)]
static DOTTED_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+\.[0-9]+\.[0-9]+").expect("valid version pattern"));

/// Extract the first `MAJOR.MINOR.PATCH` substring from a release tag
///
/// # Errors
///
/// Returns [`Error::UnparsableVersion`] if the tag contains no such substring.
///
/// # Examples
///
/// ```
/// use altstore_sync::version::extract_version;
///
/// assert_eq!(extract_version("v1.4.5").unwrap(), "1.4.5");
/// assert!(extract_version("nightly").is_err());
/// ```
pub fn extract_version(tag: &str) -> Result<String> {
    DOTTED_VERSION
        .find(tag)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| Error::UnparsableVersion {
            tag: tag.to_string(),
        })
}

/// The version with its separators removed (`1.4.5` -> `145`)
///
/// Used as the build number in artifact filenames.
pub fn build_number(version: &str) -> String {
    version.chars().filter(|c| c.is_ascii_digit()).collect()
}
