//! Content API shapes for pages.

use serde::{Deserialize, Serialize};

/// Message attached to a new version when the caller does not supply one.
pub const DEFAULT_VERSION_MESSAGE: &str = "Updated version";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(rename = "type", default = "page_type")]
    pub content_type: String,
    #[serde(default)]
    pub status: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<PageBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<Space>,
    #[serde(rename = "_links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
}

fn page_type() -> String {
    "page".to_string()
}

impl Page {
    /// Current optimistic-concurrency counter, if the response carried one.
    pub fn version_number(&self) -> Option<u64> {
        self.version.as_ref().map(|v| v.number)
    }

    pub fn storage_value(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.storage.as_ref())
            .map(|s| s.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub number: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<Storage>,
}

/// Confluence storage-format XHTML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Storage {
    pub value: String,
    pub representation: String,
}

impl Storage {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            representation: "storage".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Space {
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub webui: Option<String>,
    #[serde(rename = "self", default)]
    pub self_link: Option<String>,
}

/// One page of listing or search results.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentList {
    #[serde(default)]
    pub results: Vec<Page>,
    #[serde(default)]
    pub start: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub size: Option<u32>,
}

/// PUT body for a page update.
#[derive(Debug, Clone, Serialize)]
pub struct PageUpdate {
    pub id: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub title: String,
    pub body: PageBody,
    pub version: VersionUpdate,
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionUpdate {
    pub number: u64,
    pub message: String,
}

impl PageUpdate {
    /// Update that supersedes `current_version` with `current_version + 1`.
    pub fn next_version(id: &str, title: &str, body: &str, current_version: u64, message: &str) -> Self {
        Self {
            id: id.to_string(),
            content_type: "page".to_string(),
            title: title.to_string(),
            body: PageBody {
                storage: Some(Storage::new(body)),
            },
            version: VersionUpdate {
                number: current_version + 1,
                message: message.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_listing() {
        let raw = json!({
            "results": [{
                "id": "12345",
                "type": "page",
                "status": "current",
                "title": "Runbook",
                "version": {"number": 7, "when": "2024-03-01T10:00:00.000Z"},
                "body": {"storage": {"value": "<p>hi</p>", "representation": "storage"}},
                "space": {"key": "ENG", "name": "Engineering"},
                "_links": {"webui": "/spaces/ENG/pages/12345"}
            }],
            "start": 0,
            "limit": 25,
            "size": 1
        });

        let list: ContentList = serde_json::from_value(raw).unwrap();
        assert_eq!(list.size, Some(1));
        let page = &list.results[0];
        assert_eq!(page.version_number(), Some(7));
        assert_eq!(page.storage_value(), Some("<p>hi</p>"));
        assert_eq!(page.space.as_ref().map(|s| s.key.as_str()), Some("ENG"));
    }

    #[test]
    fn test_update_body_shape() {
        let update = PageUpdate::next_version("12345", "New title", "<p>new</p>", 7, DEFAULT_VERSION_MESSAGE);
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({
                "id": "12345",
                "type": "page",
                "title": "New title",
                "body": {"storage": {"value": "<p>new</p>", "representation": "storage"}},
                "version": {"number": 8, "message": "Updated version"}
            })
        );
    }
}
