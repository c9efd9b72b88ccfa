///! GitHub issue-search API client
///!
///! Queries pull requests authored by a fixed identity per repository.
///! Runs unauthenticated; a rate-limit hit is signalled by a non-JSON
///! response (or an error-shaped body, handled by the parser) rather
///! than a clean status code.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use super::parser::parse_search_body;
use super::types::PrFetch;
use crate::config::GithubConfig;

const REQUEST_TIMEOUT_SECONDS: u64 = 30;

pub struct GithubClient {
    client: Client,
    api_base: String,
    author: String,
}

impl GithubClient {
    pub fn new(config: &GithubConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to build GitHub HTTP client")?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            author: config.author.clone(),
        })
    }

    fn search_url(&self, repo: &str) -> String {
        let query = format!("repo:{} author:{} type:pr", repo, self.author);
        format!(
            "{}/search/issues?q={}&sort=updated&order=desc&per_page=20",
            self.api_base,
            urlencoding::encode(&query)
        )
    }

    /// Fetch all PRs by the configured author for one repository
    /// (single page, most recently updated first).
    pub async fn fetch_pull_requests(&self, repo: &str) -> Result<PrFetch> {
        let url = self.search_url(repo);
        tracing::debug!("Searching PRs: {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await
            .context(format!("Failed to send PR search request for {}", repo))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.contains("application/json") {
            tracing::warn!(
                "Non-JSON search response for {} (status {}), treating as rate limit",
                repo,
                status
            );
            return Ok(PrFetch::RateLimited);
        }

        let body = response
            .text()
            .await
            .context(format!("Failed to read PR search body for {}", repo))?;

        Ok(parse_search_body(&body))
    }
}
