///! GitHub issue-search response parser
///!
///! Classifies a search payload as a PR list, a valid empty result, or a
///! rate-limit signal. An unauthenticated quota hit surfaces as either a
///! non-JSON body or an error-shaped JSON object with a top-level
///! `message` field; both are distinct from an empty `items` array.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::types::{PrFetch, PrState, PullRequest};

/// Raw search item as returned by the issues-search API
#[derive(Debug, Deserialize)]
struct RawItem {
    number: u64,
    state: String,
    title: String,
    html_url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    pull_request: Option<RawPrRef>,
}

/// The `pull_request` sub-object; only `merged_at` is of interest
#[derive(Debug, Deserialize)]
struct RawPrRef {
    merged_at: Option<DateTime<Utc>>,
}

/// Wrapper for the search response
#[derive(Debug, Deserialize)]
struct SearchResponse {
    message: Option<String>,
    #[serde(default)]
    items: Vec<RawItem>,
}

fn derive_state(item: &RawItem) -> PrState {
    if item
        .pull_request
        .as_ref()
        .map_or(false, |pr| pr.merged_at.is_some())
    {
        PrState::Merged
    } else if item.state == "open" {
        PrState::Open
    } else {
        PrState::Closed
    }
}

/// Parse a search response body into a [`PrFetch`].
///
/// The API already returns items sorted most-recently-updated first; that
/// order is preserved so `first()` is always the latest PR.
pub fn parse_search_body(body: &str) -> PrFetch {
    let resp: SearchResponse = match serde_json::from_str(body) {
        Ok(resp) => resp,
        Err(e) => {
            tracing::warn!("Unparseable search payload, treating as rate limit: {}", e);
            return PrFetch::RateLimited;
        }
    };

    if let Some(message) = resp.message {
        tracing::warn!("Search API error response: {}", message);
        return PrFetch::RateLimited;
    }

    let prs = resp
        .items
        .iter()
        .map(|item| PullRequest {
            number: item.number,
            status: derive_state(item),
            url: item.html_url.clone(),
            title: item.title.clone(),
            created_at: item.created_at,
            updated_at: item.updated_at,
            closed_at: item.closed_at,
        })
        .collect();

    PrFetch::Fetched(prs)
}
