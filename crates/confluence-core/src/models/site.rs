use serde::{Deserialize, Serialize};

/// A cloud site returned by `/oauth/token/accessible-resources`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessibleResource {
    /// The cloud id used in `/ex/<product>/<cloudId>` paths.
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(rename = "avatarUrl", default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}
