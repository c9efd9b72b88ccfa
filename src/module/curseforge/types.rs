///! CurseForge release check data types

use serde::{Deserialize, Serialize};

/// Result of checking whether a mod has a published build for its
/// target game version. Keyed by curseforge slug in the state document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseCheck {
    pub released: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReleaseCheck {
    /// Local precondition failure: the record is missing the fields a
    /// release check needs. Not a network error.
    pub fn missing_fields() -> Self {
        Self {
            released: false,
            error: Some("missing curseforge_slug or target_version".to_string()),
            ..Default::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            released: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}
