//! Release feed and catalog fixtures

use serde_json::{Value, json};

/// Catalog with one app and no version history
pub const EMPTY_HISTORY_CATALOG: &str = r##"{
  "name": "Venera",
  "identifier": "com.github.wgh136.venera.source",
  "apps": [
    {
      "name": "Venera",
      "bundleIdentifier": "com.github.wgh136.venera",
      "developerName": "wgh136",
      "iconURL": "https://example.com/icon.png",
      "versions": []
    }
  ],
  "news": []
}"##;

/// Catalog that already lists 1.0.0
pub const ONE_VERSION_CATALOG: &str = r##"{
  "name": "Venera",
  "apps": [
    {
      "name": "Venera",
      "bundleIdentifier": "com.github.wgh136.venera",
      "version": "1.0.0",
      "versionDate": "2024-01-01",
      "versionDescription": "first",
      "downloadURL": "https://example.com/venera-ios-1.0.0+100.ipa",
      "size": 500,
      "versions": [
        {
          "version": "1.0.0",
          "date": "2024-01-01",
          "localizedDescription": "first",
          "downloadURL": "https://example.com/venera-ios-1.0.0+100.ipa",
          "size": 500,
          "minOSVersion": "14.0"
        }
      ]
    }
  ],
  "news": [
    {
      "appID": "com.github.wgh136.venera",
      "caption": "Update of Venera just got released!",
      "date": "2024-01-01T00:00:00Z",
      "identifier": "release-v1.0.0",
      "notify": true,
      "tintColor": "#0784FC",
      "title": "v1.0.0 - Venera  01/01/24",
      "url": "https://github.com/venera-app/venera/releases/tag/v1.0.0"
    }
  ]
}"##;

/// Catalog without any app
pub const NO_APPS_CATALOG: &str = r#"{"apps": [], "news": []}"#;

/// Expected artifact filename for a version under the default template
pub fn artifact_name(version: &str) -> String {
    format!("venera-ios-{}+{}.ipa", version, version.replace('.', ""))
}

/// A release object as the GitHub API returns it
pub fn release(tag: &str, published_at: &str, assets: Vec<Value>) -> Value {
    json!({
        "tag_name": tag,
        "name": tag,
        "draft": false,
        "prerelease": false,
        "published_at": published_at,
        "html_url": format!("https://github.com/venera-app/venera/releases/tag/{tag}"),
        "body": "## What's new\r\n\r\n- **Faster** reader\r\n- Fixed `crash`",
        "assets": assets,
    })
}

/// A release asset hosted on `base_url`; `size: None` omits the size field
pub fn asset(base_url: &str, name: &str, size: Option<u64>) -> Value {
    let mut asset = json!({
        "name": name,
        "browser_download_url": format!("{base_url}/download/{name}"),
        "content_type": "application/octet-stream",
        "state": "uploaded",
    });
    if let Some(size) = size {
        asset["size"] = json!(size);
    }
    asset
}
