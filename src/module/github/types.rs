///! GitHub pull request data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrState {
    Open,
    Merged,
    Closed,
}

/// One pull request as tracked in the state document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub status: PrState,
    pub url: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

/// Outcome of one PR-search call.
///
/// An empty `Fetched` list is a valid "no PRs" answer and must overwrite
/// previously stored data; `RateLimited` means the quota is exhausted and
/// the previous data must be preserved.
#[derive(Debug, Clone, PartialEq)]
pub enum PrFetch {
    Fetched(Vec<PullRequest>),
    RateLimited,
}
