//! Core types: upstream releases and the persisted catalog document
//!
//! Catalog types keep every key they do not model in an `extra` map, so a
//! load/save cycle never drops fields that other tools maintain. Documents
//! read through [`Catalog::from_document`] also remember the key order of
//! each object, and [`Catalog::to_document`] writes managed fields back into
//! their original slots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A published release as returned by the hosting API
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Release {
    /// Release tag (e.g., "v1.4.5")
    pub tag_name: String,

    /// Publication timestamp
    pub published_at: DateTime<Utc>,

    /// Release notes (markdown, possibly absent)
    #[serde(default)]
    pub body: Option<String>,

    /// Link to the release page
    #[serde(default)]
    pub html_url: Option<String>,

    /// Attached files, in API order
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// A file attached to a release
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Asset {
    /// Filename, unique within its release
    pub name: String,

    /// Direct download URL
    pub browser_download_url: String,

    /// Declared size in bytes, if the API reported one
    #[serde(default)]
    pub size: Option<u64>,
}

/// The catalog document
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Distributed applications; sync targets the first
    #[serde(default)]
    pub apps: Vec<AppSummary>,

    /// Announcements shown to users
    #[serde(default)]
    pub news: Vec<NewsEntry>,

    /// Keys not managed by this crate (name, identifier, sourceURL, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// Key order of the object this was read from
    #[serde(skip)]
    pub layout: KeyOrder,
}

impl Catalog {
    /// Decode a catalog document, remembering the key order of every object
    ///
    /// # Errors
    ///
    /// Returns the decoding error if `document` is not a valid catalog.
    pub fn from_document(document: Value) -> serde_json::Result<Self> {
        let mut catalog: Catalog = serde_json::from_value(document.clone())?;
        catalog.layout = KeyOrder::of(&document);
        for (app, raw_app) in catalog.apps.iter_mut().zip(array_at(&document, "apps")) {
            app.layout = KeyOrder::of(raw_app);
            for (entry, raw_entry) in app.versions.iter_mut().zip(array_at(raw_app, "versions")) {
                entry.layout = KeyOrder::of(raw_entry);
            }
        }
        for (entry, raw_entry) in catalog.news.iter_mut().zip(array_at(&document, "news")) {
            entry.layout = KeyOrder::of(raw_entry);
        }
        Ok(catalog)
    }

    /// Encode the catalog, putting every key back where it was read from
    ///
    /// Keys an object did not have when read (or every key, for objects
    /// created in memory) follow in field order.
    ///
    /// # Errors
    ///
    /// Returns the encoding error if serialization fails.
    pub fn to_document(&self) -> serde_json::Result<Value> {
        let mut document = serde_json::to_value(self)?;
        if let Some(apps) = document.get_mut("apps").and_then(Value::as_array_mut) {
            for (app, raw_app) in self.apps.iter().zip(apps.iter_mut()) {
                if let Some(versions) = raw_app.get_mut("versions").and_then(Value::as_array_mut) {
                    for (entry, raw_entry) in app.versions.iter().zip(versions.iter_mut()) {
                        entry.layout.apply(raw_entry);
                    }
                }
                app.layout.apply(raw_app);
            }
        }
        if let Some(news) = document.get_mut("news").and_then(Value::as_array_mut) {
            for (entry, raw_entry) in self.news.iter().zip(news.iter_mut()) {
                entry.layout.apply(raw_entry);
            }
        }
        self.layout.apply(&mut document);
        Ok(document)
    }
}

fn array_at<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Key order of a JSON object as it was read
///
/// Order is presentation only: any two layouts compare equal, so catalogs
/// are compared by content.
#[derive(Clone, Debug, Default)]
pub struct KeyOrder(Vec<String>);

impl KeyOrder {
    /// Record the key order of `value` (empty unless it is an object)
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self(map.keys().cloned().collect()),
            _ => Self::default(),
        }
    }

    /// Recorded keys, in order
    pub fn keys(&self) -> &[String] {
        &self.0
    }

    /// Reorder the keys of `value` to the recorded order
    ///
    /// Keys that were not recorded keep their relative order after the
    /// recorded ones.
    pub fn apply(&self, value: &mut Value) {
        let Value::Object(map) = value else {
            return;
        };
        if self.0.is_empty() {
            return;
        }
        let mut slots: Vec<(String, Option<Value>)> = std::mem::take(map)
            .into_iter()
            .map(|(key, value)| (key, Some(value)))
            .collect();
        for key in &self.0 {
            if let Some((_, slot)) = slots.iter_mut().find(|(k, _)| k == key)
                && let Some(value) = slot.take()
            {
                map.insert(key.clone(), value);
            }
        }
        for (key, slot) in slots {
            if let Some(value) = slot {
                map.insert(key, value);
            }
        }
    }
}

impl PartialEq for KeyOrder {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

/// An application record with its current version summary and history
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AppSummary {
    /// Current version
    #[serde(default)]
    pub version: String,

    /// Current version date (`YYYY-MM-DD`)
    #[serde(default, rename = "versionDate")]
    pub version_date: String,

    /// Current version description
    #[serde(default, rename = "versionDescription")]
    pub version_description: String,

    /// Current download URL
    #[serde(default, rename = "downloadURL")]
    pub download_url: String,

    /// Current artifact size in bytes
    #[serde(default)]
    pub size: u64,

    /// Version history, newest first
    #[serde(default)]
    pub versions: Vec<VersionEntry>,

    /// Keys not managed by this crate
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// Key order of the object this was read from
    #[serde(skip)]
    pub layout: KeyOrder,
}

impl AppSummary {
    /// Overwrite the current-version fields from a history entry
    pub fn set_current(&mut self, entry: &VersionEntry) {
        self.version = entry.version.clone();
        self.version_date = entry.date.clone();
        self.version_description = entry.localized_description.clone();
        self.download_url = entry.download_url.clone();
        self.size = entry.size;
    }

    /// Whether the summary fields mirror the given history entry
    pub fn is_current(&self, entry: &VersionEntry) -> bool {
        self.version == entry.version
            && self.version_date == entry.date
            && self.version_description == entry.localized_description
            && self.download_url == entry.download_url
            && self.size == entry.size
    }
}

/// One entry of an app's version history
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// Dotted numeric version
    pub version: String,

    /// Release date (`YYYY-MM-DD`)
    #[serde(default)]
    pub date: String,

    /// Release notes shown by the client
    #[serde(default, rename = "localizedDescription")]
    pub localized_description: String,

    /// Artifact download URL
    #[serde(default, rename = "downloadURL")]
    pub download_url: String,

    /// Artifact size in bytes
    #[serde(default)]
    pub size: u64,

    /// Keys not managed by this crate (minOSVersion, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// Key order of the object this was read from
    #[serde(skip)]
    pub layout: KeyOrder,
}

/// A catalog-level announcement
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsEntry {
    /// Bundle identifier of the announced app
    #[serde(default, rename = "appID")]
    pub app_id: String,

    /// Short caption
    #[serde(default)]
    pub caption: String,

    /// Publication timestamp
    #[serde(default)]
    pub date: String,

    /// Unique identifier within the news list
    pub identifier: String,

    /// Whether clients should raise a notification
    #[serde(default)]
    pub notify: bool,

    /// Display color
    #[serde(default, rename = "tintColor")]
    pub tint_color: String,

    /// Headline
    #[serde(default)]
    pub title: String,

    /// Link to the release page
    #[serde(default)]
    pub url: String,

    /// Keys not managed by this crate (imageURL, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// Key order of the object this was read from
    #[serde(skip)]
    pub layout: KeyOrder,
}
