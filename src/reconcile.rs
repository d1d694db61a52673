//! Catalog reconciliation
//!
//! Merges one release into a loaded [`Catalog`]. This is a pure in-memory
//! transformation: nothing here touches the network or the filesystem, and
//! applying the same update twice leaves the catalog exactly as applying it
//! once.

use crate::config::CatalogConfig;
use crate::error::{Error, Result};
use crate::types::{Catalog, NewsEntry, VersionEntry};
use chrono::{DateTime, SecondsFormat, Utc};

/// Everything the reconciler needs to know about the release being published
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReleaseUpdate {
    /// Release tag (e.g., "v1.4.5")
    pub tag: String,
    /// Version extracted from the tag
    pub version: String,
    /// Publication timestamp
    pub published_at: DateTime<Utc>,
    /// Normalized release notes
    pub description: String,
    /// Artifact download URL
    pub download_url: String,
    /// Artifact size in bytes
    pub size: u64,
    /// Link to the release page, used by the news entry
    pub release_url: String,
}

impl ReleaseUpdate {
    /// Release date as written into the catalog (`YYYY-MM-DD`)
    pub fn version_date(&self) -> String {
        self.published_at.format("%Y-%m-%d").to_string()
    }

    /// The history entry this update produces
    pub fn version_entry(&self) -> VersionEntry {
        VersionEntry {
            version: self.version.clone(),
            date: self.version_date(),
            localized_description: self.description.clone(),
            download_url: self.download_url.clone(),
            size: self.size,
            ..Default::default()
        }
    }
}

/// Presentation settings for news entries
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewsSettings {
    /// `appID` of the announced app
    pub app_id: String,
    /// Name shown in the title
    pub app_name: String,
    /// Caption text
    pub caption: String,
    /// Display color
    pub tint_color: String,
    /// Whether clients should notify
    pub notify: bool,
}

impl From<&CatalogConfig> for NewsSettings {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            app_id: config.app_id.clone(),
            app_name: config.app_name.clone(),
            caption: config.news_caption.clone(),
            tint_color: config.tint_color.clone(),
            notify: config.notify,
        }
    }
}

/// What a reconciliation did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// An existing history entry for the same version was replaced
    pub replaced_existing: bool,
    /// A news entry was appended
    pub news_added: bool,
    /// The catalog differs from its state before reconciliation
    pub changed: bool,
}

/// News identifier for a release tag
pub fn news_identifier(tag: &str) -> String {
    format!("release-{tag}")
}

/// Put `entry` at the front of a newest-first history
///
/// An entry with the same version is replaced rather than duplicated: the
/// first one is moved to index 0 and overwritten, keeping the relative order
/// of every other entry and any keys (and key order) of the old entry that
/// this crate does not manage. Later entries with the same version are
/// dropped, so the history holds the version once. Returns whether an
/// existing entry was replaced.
pub fn upsert_version(history: &mut Vec<VersionEntry>, mut entry: VersionEntry) -> bool {
    let Some(idx) = history.iter().position(|e| e.version == entry.version) else {
        history.insert(0, entry);
        return false;
    };

    history[..=idx].rotate_right(1);
    let stale = std::mem::take(&mut history[0]);
    if entry.extra.is_empty() {
        entry.extra = stale.extra;
        entry.layout = stale.layout;
    }
    history[0] = entry;

    let version = history[0].version.clone();
    let mut rest = history.split_off(1);
    rest.retain(|e| e.version != version);
    history.append(&mut rest);
    true
}

/// Merge a release into the catalog
///
/// Targets the first app: its history gets the new version at index 0, its
/// summary fields are set from that entry, and a news entry keyed by the
/// release tag is appended unless one already exists.
///
/// # Errors
///
/// Returns [`Error::EmptyCatalog`] if the catalog has no apps. The catalog is
/// left untouched in that case.
pub fn reconcile(
    catalog: &mut Catalog,
    update: &ReleaseUpdate,
    news: &NewsSettings,
) -> Result<ReconcileOutcome> {
    let before = catalog.clone();
    let app = catalog.apps.first_mut().ok_or(Error::EmptyCatalog)?;

    let replaced_existing = upsert_version(&mut app.versions, update.version_entry());
    let current = app.versions[0].clone();
    app.set_current(&current);

    let identifier = news_identifier(&update.tag);
    let news_added = !catalog.news.iter().any(|n| n.identifier == identifier);
    if news_added {
        catalog.news.push(NewsEntry {
            app_id: news.app_id.clone(),
            caption: news.caption.clone(),
            date: update
                .published_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            identifier,
            notify: news.notify,
            tint_color: news.tint_color.clone(),
            title: format!(
                "{} - {}  {}",
                update.tag,
                news.app_name,
                update.published_at.format("%d/%m/%y")
            ),
            url: update.release_url.clone(),
            ..Default::default()
        });
    }

    Ok(ReconcileOutcome {
        replaced_existing,
        news_added,
        changed: *catalog != before,
    })
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AppSummary;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn settings() -> NewsSettings {
        NewsSettings::from(&CatalogConfig::default())
    }

    fn update(tag: &str, version: &str, description: &str) -> ReleaseUpdate {
        ReleaseUpdate {
            tag: tag.to_string(),
            version: version.to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            description: description.to_string(),
            download_url: format!("https://dl/venera-ios-{version}.ipa"),
            size: 1000,
            release_url: format!("https://github.com/venera-app/venera/releases/tag/{tag}"),
        }
    }

    fn entry(version: &str) -> VersionEntry {
        VersionEntry {
            version: version.to_string(),
            date: "2023-01-01".to_string(),
            localized_description: format!("notes for {version}"),
            download_url: format!("https://dl/{version}.ipa"),
            size: 10,
            ..Default::default()
        }
    }

    fn catalog_with_history(versions: &[&str]) -> Catalog {
        let history: Vec<VersionEntry> = versions.iter().map(|v| entry(v)).collect();
        let mut app = AppSummary {
            versions: history,
            ..Default::default()
        };
        if let Some(first) = app.versions.first().cloned() {
            app.set_current(&first);
        }
        Catalog {
            apps: vec![app],
            ..Default::default()
        }
    }

    fn versions_of(catalog: &Catalog) -> Vec<&str> {
        catalog.apps[0]
            .versions
            .iter()
            .map(|e| e.version.as_str())
            .collect()
    }

    #[test]
    fn test_new_version_goes_first_and_keeps_order() {
        let mut catalog = catalog_with_history(&["1.2.0", "1.1.0", "1.0.0"]);
        let outcome = reconcile(&mut catalog, &update("v1.3.0", "1.3.0", "new"), &settings())
            .unwrap();

        assert_eq!(versions_of(&catalog), vec!["1.3.0", "1.2.0", "1.1.0", "1.0.0"]);
        assert!(!outcome.replaced_existing);
        assert!(outcome.news_added);
        assert!(outcome.changed);
    }

    #[test]
    fn test_summary_matches_history_head() {
        let mut catalog = catalog_with_history(&["1.0.0"]);
        reconcile(&mut catalog, &update("v1.1.0", "1.1.0", "fresh"), &settings()).unwrap();

        let app = &catalog.apps[0];
        assert!(app.is_current(&app.versions[0]));
        assert_eq!(app.version, "1.1.0");
        assert_eq!(app.version_date, "2024-03-01");
        assert_eq!(app.version_description, "fresh");
        assert_eq!(app.download_url, "https://dl/venera-ios-1.1.0.ipa");
        assert_eq!(app.size, 1000);
    }

    #[test]
    fn test_same_version_replaces_without_growing() {
        let mut catalog = catalog_with_history(&["1.1.0", "1.0.0"]);
        let outcome = reconcile(
            &mut catalog,
            &update("v1.1.0", "1.1.0", "corrected notes"),
            &settings(),
        )
        .unwrap();

        assert!(outcome.replaced_existing);
        assert_eq!(versions_of(&catalog), vec!["1.1.0", "1.0.0"]);
        assert_eq!(
            catalog.apps[0].versions[0].localized_description,
            "corrected notes"
        );
        assert_eq!(catalog.apps[0].version_description, "corrected notes");
    }

    #[test]
    fn test_same_version_deeper_in_history_moves_to_front() {
        let mut catalog = catalog_with_history(&["1.2.0", "1.1.0", "1.0.0"]);
        reconcile(&mut catalog, &update("v1.1.0", "1.1.0", "re-release"), &settings()).unwrap();

        assert_eq!(versions_of(&catalog), vec!["1.1.0", "1.2.0", "1.0.0"]);
        assert_eq!(catalog.apps[0].version, "1.1.0");
    }

    #[test]
    fn test_duplicate_versions_collapse_to_one() {
        let mut catalog = catalog_with_history(&["1.0.0", "1.1.0", "1.1.0"]);
        catalog.apps[0].versions[1].localized_description = "b".to_string();
        catalog.apps[0].versions[2].localized_description = "c".to_string();

        let outcome =
            reconcile(&mut catalog, &update("v1.1.0", "1.1.0", "fixed"), &settings()).unwrap();

        assert!(outcome.replaced_existing);
        assert_eq!(versions_of(&catalog), vec!["1.1.0", "1.0.0"]);
        assert_eq!(catalog.apps[0].versions[0].localized_description, "fixed");
    }

    #[test]
    fn test_duplicate_of_current_version_is_dropped() {
        let mut history = vec![entry("2.0.0"), entry("1.0.0"), entry("2.0.0")];
        assert!(upsert_version(&mut history, entry("2.0.0")));
        let versions: Vec<&str> = history.iter().map(|e| e.version.as_str()).collect();
        assert_eq!(versions, vec!["2.0.0", "1.0.0"]);
    }

    #[test]
    fn test_replacement_keeps_unmanaged_keys() {
        let mut catalog = catalog_with_history(&["1.0.0"]);
        catalog.apps[0].versions[0]
            .extra
            .insert("minOSVersion".to_string(), json!("14.0"));

        reconcile(&mut catalog, &update("v1.0.0", "1.0.0", "again"), &settings()).unwrap();
        assert_eq!(catalog.apps[0].versions[0].extra["minOSVersion"], "14.0");
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let start = catalog_with_history(&["1.0.0"]);
        let release = update("v2.0.0", "2.0.0", "notes");

        let mut once = start.clone();
        reconcile(&mut once, &release, &settings()).unwrap();

        let mut twice = start.clone();
        reconcile(&mut twice, &release, &settings()).unwrap();
        let second = reconcile(&mut twice, &release, &settings()).unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice.news.len(), 1);
        assert_eq!(twice.apps[0].versions.len(), 2);
        assert!(second.replaced_existing);
        assert!(!second.news_added);
        assert!(!second.changed);
    }

    #[test]
    fn test_news_entry_contents() {
        let mut catalog = catalog_with_history(&[]);
        reconcile(&mut catalog, &update("v2.0.0", "2.0.0", "notes"), &settings()).unwrap();

        assert_eq!(catalog.news.len(), 1);
        let news = &catalog.news[0];
        assert_eq!(news.identifier, "release-v2.0.0");
        assert_eq!(news.app_id, "com.github.wgh136.venera");
        assert_eq!(news.caption, "Update of Venera just got released!");
        assert_eq!(news.date, "2024-03-01T12:00:00Z");
        assert!(news.notify);
        assert_eq!(news.tint_color, "#0784FC");
        assert_eq!(news.title, "v2.0.0 - Venera  01/03/24");
        assert_eq!(
            news.url,
            "https://github.com/venera-app/venera/releases/tag/v2.0.0"
        );
    }

    #[test]
    fn test_existing_news_for_tag_is_not_duplicated() {
        let mut catalog = catalog_with_history(&["1.0.0"]);
        catalog.news.push(NewsEntry {
            identifier: "release-v2.0.0".to_string(),
            caption: "hand-written".to_string(),
            ..Default::default()
        });

        let outcome =
            reconcile(&mut catalog, &update("v2.0.0", "2.0.0", "notes"), &settings()).unwrap();
        assert!(!outcome.news_added);
        assert_eq!(catalog.news.len(), 1);
        assert_eq!(catalog.news[0].caption, "hand-written");
    }

    #[test]
    fn test_empty_catalog_fails_untouched() {
        let mut catalog = Catalog::default();
        let result = reconcile(&mut catalog, &update("v1.0.0", "1.0.0", "x"), &settings());
        assert!(matches!(result, Err(Error::EmptyCatalog)));
        assert_eq!(catalog, Catalog::default());
    }

    #[test]
    fn test_only_first_app_is_updated() {
        let mut catalog = catalog_with_history(&["1.0.0"]);
        let other = catalog.apps[0].clone();
        catalog.apps.push(other.clone());

        reconcile(&mut catalog, &update("v1.1.0", "1.1.0", "x"), &settings()).unwrap();
        assert_eq!(catalog.apps[0].version, "1.1.0");
        assert_eq!(catalog.apps[1], other);
    }

    #[test]
    fn test_upsert_version_into_empty_history() {
        let mut history = Vec::new();
        assert!(!upsert_version(&mut history, entry("1.0.0")));
        assert_eq!(history.len(), 1);
    }
}
