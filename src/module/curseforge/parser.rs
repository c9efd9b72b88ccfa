///! CurseForge files-listing parser
///!
///! The version-tag list attached to each file has shipped in several
///! shapes over time: plain string arrays, and object arrays exposing
///! the version under one of several field names. The probe below
///! tolerates all of them and falls back to an empty string rather
///! than erroring on an unknown shape.

use serde::Deserialize;
use serde_json::Value;

use super::types::ReleaseCheck;

pub const CHECK_METHOD: &str = "curseforge-api";

/// One file entry from the files-listing API
#[derive(Debug, Deserialize)]
pub struct RawFile {
    pub id: Option<u64>,
    #[serde(rename = "fileName")]
    pub file_name: Option<String>,
    #[serde(rename = "gameVersions", default)]
    pub game_versions: Vec<Value>,
    #[serde(rename = "sortableGameVersions", default)]
    pub sortable_game_versions: Vec<Value>,
}

/// Wrapper for the files-listing response
#[derive(Debug, Deserialize)]
pub struct FilesResponse {
    #[serde(default)]
    pub data: Vec<RawFile>,
}

/// Extract a version string from one tag entry, whatever its shape
fn version_string(tag: &Value) -> String {
    match tag {
        Value::String(s) => s.clone(),
        Value::Object(obj) => ["gameVersionName", "name", "gameVersion"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_str))
            .unwrap_or("")
            .to_string(),
        _ => String::new(),
    }
}

fn file_versions(file: &RawFile) -> Vec<String> {
    let tags = if !file.game_versions.is_empty() {
        &file.game_versions
    } else {
        &file.sortable_game_versions
    };
    tags.iter().map(version_string).collect()
}

/// Scan the file list for the first file supporting `target_version`
/// (exact or substring match).
pub fn find_release(response: &FilesResponse, target_version: &str) -> ReleaseCheck {
    for file in &response.data {
        let matched = file_versions(file)
            .iter()
            .any(|v| v == target_version || v.contains(target_version));

        if matched {
            return ReleaseCheck {
                released: true,
                file_name: file.file_name.clone(),
                file_id: file.id,
                method: Some(CHECK_METHOD.to_string()),
                error: None,
            };
        }
    }

    ReleaseCheck {
        released: false,
        method: Some(CHECK_METHOD.to_string()),
        ..Default::default()
    }
}
