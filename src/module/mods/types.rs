///! Mod tracking data types
///!
///! The persisted state document and the records it contains.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::module::curseforge::ReleaseCheck;
use crate::module::github::PullRequest;

/// One tracked mod, as curated in the state document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModRecord {
    pub name: String,
    /// "owner/name" GitHub repository; unique across all buckets when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    pub description: String,
    /// Relationship to the mod, e.g. "Author" or "Maintainer"
    pub role: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Migration label shown as a tag, e.g. "1.20.1 → 1.21"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migration: Option<String>,
    /// Game version whose release is being waited for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_version: Option<String>,
    pub curseforge_id: u64,
    pub curseforge_slug: String,
    /// Human-formatted download count, e.g. "1.2K"; used by compact layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloads: Option<String>,
}

/// Lifecycle bucket a mod currently sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Active,
    InDevelopment,
    Released,
}

/// The three ordered lifecycle buckets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModBuckets {
    #[serde(default)]
    pub active: Vec<ModRecord>,
    #[serde(default)]
    pub in_development: Vec<ModRecord>,
    #[serde(default)]
    pub released: Vec<ModRecord>,
}

/// The whole persisted document: curated mods plus attached status maps.
/// Read once at startup, written once after a full reconciliation pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedState {
    pub mods: ModBuckets,
    /// Per-repo PR lists, most recently updated first
    #[serde(default)]
    pub pr_status: BTreeMap<String, Vec<PullRequest>>,
    /// Per-slug result of the latest release check
    #[serde(default)]
    pub release_status: BTreeMap<String, ReleaseCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl PersistedState {
    /// Latest PR for a repo, if any is known
    pub fn latest_pr(&self, repo: &str) -> Option<&PullRequest> {
        self.pr_status.get(repo).and_then(|prs| prs.first())
    }
}
