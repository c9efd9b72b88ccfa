///! Status update orchestrator
///!
///! One full cycle: read the state document, check releases and PRs for
///! every tracked item strictly one at a time (paced to stay under the
///! unauthenticated quotas), reconcile, write the document back once,
///! then regenerate the rendered artifacts.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;

use super::curseforge::CurseforgeClient;
use super::github::{GithubClient, PrFetch};
use super::layout::{layout_board, LayoutMode, Theme};
use super::mods::{store, PersistedState};
use super::pacing::Pacer;
use super::reconcile::{reconcile, FetchBatch};
use super::renderer::{BadgeRenderer, SvgRenderer};
use super::splice::splice_file;
use crate::config::AppConfig;

pub struct StatusUpdater {
    config: AppConfig,
    github: GithubClient,
    curseforge: CurseforgeClient,
}

impl StatusUpdater {
    pub fn new(config: AppConfig) -> Result<Self> {
        let github = GithubClient::new(&config.github)?;
        let curseforge = CurseforgeClient::new(&config.curseforge)?;
        Ok(Self {
            config,
            github,
            curseforge,
        })
    }

    /// Run one complete update cycle
    pub async fn run(&self) -> Result<()> {
        let state_path = PathBuf::from(&self.config.state_file);
        let mut state = store::load(&state_path).await?;

        tracing::info!(
            "Loaded state: {} active, {} in development, {} released",
            state.mods.active.len(),
            state.mods.in_development.len(),
            state.mods.released.len()
        );

        let batch = self.fetch_all(&state).await;
        reconcile(&mut state, &batch, Utc::now());

        // Single write for the whole batch; a crash before this point
        // leaves the previous document intact
        store::save(&state_path, &state).await?;
        tracing::info!("State written to {:?}", state_path);

        self.render_artifacts(&state).await?;
        Ok(())
    }

    /// Sequentially fetch release checks and PR lists for every tracked
    /// item. Per-item failures degrade to NotFound and never abort the
    /// batch.
    async fn fetch_all(&self, state: &PersistedState) -> FetchBatch {
        let mut batch = FetchBatch::default();
        // One pacer for the whole run, so the spacing also holds between
        // the last release check and the first PR search
        let pacer = Pacer::new();
        let release_delay = Duration::from_millis(self.config.curseforge.request_delay_ms);
        let pr_delay = Duration::from_millis(self.config.github.request_delay_ms);

        // Release checks only make sense for mods still waiting on a build
        for mod_record in &state.mods.in_development {
            pacer.pace(release_delay).await;
            tracing::info!(
                "Checking {} for {} release...",
                mod_record.name,
                mod_record.target_version.as_deref().unwrap_or("?")
            );
            let check = self.curseforge.check_release(mod_record).await;
            if check.released {
                tracing::info!("  released as {:?}", check.file_name);
            } else {
                tracing::info!("  not released yet");
            }
            batch
                .release_checks
                .insert(mod_record.curseforge_slug.clone(), check);
        }

        // PRs are tracked for in-development mods and for released ones
        // (an open PR against a shipped mod drives the badge filter)
        let pr_targets = state
            .mods
            .in_development
            .iter()
            .chain(state.mods.released.iter())
            .filter_map(|m| m.repo.clone());

        for repo in pr_targets {
            pacer.pace(pr_delay).await;
            tracing::info!("Checking PRs for {}...", repo);
            let outcome = match self.github.fetch_pull_requests(&repo).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    // Transport failure: scoped to this repo, downgraded
                    // to an overwriting empty result
                    tracing::warn!("PR fetch failed for {}: {}", repo, e);
                    PrFetch::Fetched(vec![])
                }
            };
            match &outcome {
                PrFetch::RateLimited => tracing::warn!("  rate limited, keeping existing data"),
                PrFetch::Fetched(prs) if prs.is_empty() => tracing::info!("  no PRs found"),
                PrFetch::Fetched(prs) => {
                    tracing::info!("  latest: #{} ({:?})", prs[0].number, prs[0].status)
                }
            }
            batch.pr_fetches.insert(repo, outcome);
        }

        batch
    }

    /// Regenerate every configured SVG board plus the badge fragment,
    /// and splice the badges into the README. Rendering problems degrade
    /// to warnings; the reconciled state is already safely on disk.
    async fn render_artifacts(&self, state: &PersistedState) -> Result<()> {
        let output_dir = PathBuf::from(&self.config.output_dir);
        tokio::fs::create_dir_all(&output_dir)
            .await
            .context("Failed to create output directory")?;

        let site_base = &self.config.curseforge.site_base;

        for theme_name in &self.config.render.themes {
            let Some(theme) = Theme::by_name(theme_name) else {
                tracing::warn!("Unknown theme {:?}, skipping", theme_name);
                continue;
            };

            self.render_board(state, &theme, LayoutMode::Full, &output_dir)
                .await?;
            if self.config.render.compact {
                self.render_board(state, &theme, LayoutMode::Compact, &output_dir)
                    .await?;
            }
        }

        let badge_theme = self
            .config
            .render
            .themes
            .first()
            .and_then(|name| Theme::by_name(name))
            .unwrap_or_else(Theme::github_dark);
        let badges = BadgeRenderer::new(badge_theme, site_base.clone()).render(state);

        let badges_path = output_dir.join("mods-links.md");
        tokio::fs::write(&badges_path, &badges)
            .await
            .context("Failed to write badge fragment")?;
        tracing::info!("Badge fragment written to {:?}", badges_path);

        // The README is an external sink; a failed splice degrades to a
        // warning, the reconciled state is already written
        if let Err(e) = splice_file(
            Path::new(&self.config.readme_file),
            &self.config.badges.begin_marker,
            &self.config.badges.end_marker,
            &badges,
        )
        .await
        {
            tracing::warn!("README splice skipped: {}", e);
        }

        Ok(())
    }

    async fn render_board(
        &self,
        state: &PersistedState,
        theme: &Theme,
        mode: LayoutMode,
        output_dir: &Path,
    ) -> Result<()> {
        let board = layout_board(
            &state.mods,
            &state.pr_status,
            state.last_updated,
            &self.config.layout,
            mode,
            &self.config.curseforge.site_base,
        );
        let svg = SvgRenderer::new(theme.clone()).render(&board);

        let suffix = match mode {
            LayoutMode::Full => "",
            LayoutMode::Compact => "-compact",
        };
        let path = output_dir.join(format!("mods-card-{}{}.svg", theme.name, suffix));
        tokio::fs::write(&path, svg)
            .await
            .context(format!("Failed to write board: {:?}", path))?;
        tracing::info!("Board rendered to {:?}", path);
        Ok(())
    }
}
