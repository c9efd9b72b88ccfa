///! CurseForge files-listing API client
///!
///! Uses the same internal endpoint the CurseForge website uses to list
///! a project's files, newest first with alphas removed. Every failure
///! is folded into the returned [`ReleaseCheck`] so one bad mod never
///! aborts the batch.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

use super::parser::{find_release, FilesResponse};
use super::types::ReleaseCheck;
use crate::config::CurseforgeConfig;
use crate::module::mods::ModRecord;

const REQUEST_TIMEOUT_SECONDS: u64 = 30;

pub struct CurseforgeClient {
    client: Client,
    api_base: String,
    site_base: String,
}

impl CurseforgeClient {
    pub fn new(config: &CurseforgeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to build CurseForge HTTP client")?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            site_base: config.site_base.clone(),
        })
    }

    fn files_url(&self, curseforge_id: u64) -> String {
        format!(
            "{}/v1/mods/{}/files?pageIndex=0&pageSize=20&sort=dateCreated&sortDescending=true&removeAlphas=true",
            self.api_base, curseforge_id
        )
    }

    /// Check whether `mod_record` has a published build for its target
    /// version. Never fails the run: transport and schema problems come
    /// back as `{released: false, error: ...}`.
    pub async fn check_release(&self, mod_record: &ModRecord) -> ReleaseCheck {
        if mod_record.curseforge_slug.is_empty() || mod_record.target_version.is_none() {
            return ReleaseCheck::missing_fields();
        }
        let target_version = mod_record.target_version.as_deref().unwrap_or_default();

        match self.fetch_files(mod_record).await {
            Ok(response) => find_release(&response, target_version),
            Err(e) => {
                tracing::warn!("Release check failed for {}: {}", mod_record.curseforge_slug, e);
                ReleaseCheck::failed(e.to_string())
            }
        }
    }

    async fn fetch_files(&self, mod_record: &ModRecord) -> Result<FilesResponse> {
        let url = self.files_url(mod_record.curseforge_id);
        tracing::debug!("Listing files: {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header(
                "Referer",
                format!("{}/{}", self.site_base, mod_record.curseforge_slug),
            )
            .send()
            .await
            .context(format!(
                "Failed to send files request for {}",
                mod_record.curseforge_slug
            ))?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP {}", response.status());
        }

        response
            .json()
            .await
            .context(format!(
                "Failed to parse files response for {}",
                mod_record.curseforge_slug
            ))
    }
}
