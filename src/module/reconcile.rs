///! State reconciliation
///!
///! Merges one batch of fetch results into the in-memory working copy of
///! the persisted state. The caller writes the document exactly once
///! afterwards; nothing here touches disk.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::curseforge::ReleaseCheck;
use super::github::{PrFetch, PullRequest};
use super::mods::{ModBuckets, ModRecord, PersistedState};

/// Everything fetched during one run, keyed the way the state stores it
#[derive(Debug, Default)]
pub struct FetchBatch {
    /// Release checks by curseforge slug (in_development mods only)
    pub release_checks: BTreeMap<String, ReleaseCheck>,
    /// PR fetch outcomes by repo
    pub pr_fetches: BTreeMap<String, PrFetch>,
}

fn same_mod(a: &ModRecord, b: &ModRecord) -> bool {
    match (&a.repo, &b.repo) {
        (Some(ra), Some(rb)) => ra == rb,
        _ => a.curseforge_slug == b.curseforge_slug,
    }
}

/// Move every in_development mod whose fresh check came back released
/// into the released bucket. Idempotent: a mod already present in
/// `released` is not appended again.
pub fn apply_release_transitions(
    buckets: &mut ModBuckets,
    checks: &BTreeMap<String, ReleaseCheck>,
) {
    let is_released = |m: &ModRecord| {
        checks
            .get(&m.curseforge_slug)
            .map_or(false, |check| check.released)
    };

    let moved: Vec<ModRecord> = buckets
        .in_development
        .iter()
        .filter(|m| is_released(m))
        .cloned()
        .collect();

    if moved.is_empty() {
        return;
    }

    buckets.in_development.retain(|m| !is_released(m));

    for mod_record in moved {
        if buckets.released.iter().any(|m| same_mod(m, &mod_record)) {
            tracing::debug!("{} already in released bucket", mod_record.name);
            continue;
        }
        tracing::info!("Moving {} to released", mod_record.name);
        buckets.released.push(mod_record);
    }
}

/// The preserve-on-rate-limit merge: a rate-limited fetch keeps whatever
/// was stored before (possibly nothing); a successful fetch replaces it,
/// including replacement by an explicit empty list.
pub fn merge_pr_status(
    previous: Option<Vec<PullRequest>>,
    outcome: &PrFetch,
) -> Option<Vec<PullRequest>> {
    match outcome {
        PrFetch::RateLimited => previous,
        PrFetch::Fetched(prs) => Some(prs.clone()),
    }
}

/// Apply one fetch batch to the state: release transitions first, then
/// the per-repo PR merge, then the release-check map, and finally a
/// single `last_updated` stamp for the whole batch.
pub fn reconcile(state: &mut PersistedState, batch: &FetchBatch, now: DateTime<Utc>) {
    apply_release_transitions(&mut state.mods, &batch.release_checks);

    for (repo, outcome) in &batch.pr_fetches {
        let previous = state.pr_status.remove(repo);
        if let Some(merged) = merge_pr_status(previous, outcome) {
            state.pr_status.insert(repo.clone(), merged);
        }
    }

    for (slug, check) in &batch.release_checks {
        state.release_status.insert(slug.clone(), check.clone());
    }

    state.last_updated = Some(now);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::github::PrState;
    use chrono::TimeZone;

    fn mod_record(name: &str, slug: &str) -> ModRecord {
        ModRecord {
            name: name.to_string(),
            repo: Some(format!("owner/{}", slug)),
            description: "desc".to_string(),
            role: "Author".to_string(),
            tags: vec![],
            migration: None,
            target_version: Some("1.21".to_string()),
            curseforge_id: 1,
            curseforge_slug: slug.to_string(),
            downloads: None,
        }
    }

    fn released_check() -> ReleaseCheck {
        ReleaseCheck {
            released: true,
            file_name: Some("mod-1.21.jar".to_string()),
            file_id: Some(5),
            method: Some("curseforge-api".to_string()),
            error: None,
        }
    }

    fn pr(number: u64, status: PrState) -> PullRequest {
        let t = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();
        PullRequest {
            number,
            status,
            url: format!("https://github.com/owner/repo/pull/{}", number),
            title: "title".to_string(),
            created_at: t,
            updated_at: t,
            closed_at: None,
        }
    }

    #[test]
    fn test_release_transition_moves_once() {
        let mut state = PersistedState::default();
        state.mods.in_development.push(mod_record("Alpha", "alpha"));
        state.mods.in_development.push(mod_record("Beta", "beta"));

        let mut batch = FetchBatch::default();
        batch.release_checks.insert("alpha".to_string(), released_check());

        let now = Utc.with_ymd_and_hms(2026, 2, 2, 0, 0, 0).unwrap();
        reconcile(&mut state, &batch, now);

        assert_eq!(state.mods.in_development.len(), 1);
        assert_eq!(state.mods.in_development[0].name, "Beta");
        assert_eq!(state.mods.released.len(), 1);
        assert_eq!(state.mods.released[0].name, "Alpha");
        assert_eq!(state.last_updated, Some(now));
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mut state = PersistedState::default();
        state.mods.in_development.push(mod_record("Alpha", "alpha"));

        let mut batch = FetchBatch::default();
        batch.release_checks.insert("alpha".to_string(), released_check());

        let now = Utc.with_ymd_and_hms(2026, 2, 2, 0, 0, 0).unwrap();
        reconcile(&mut state, &batch, now);
        reconcile(&mut state, &batch, now);

        // Exactly one copy per released repo, never duplicated
        assert_eq!(state.mods.released.len(), 1);
        assert!(state.mods.in_development.is_empty());
    }

    #[test]
    fn test_rate_limited_preserves_previous() {
        let mut state = PersistedState::default();
        state
            .pr_status
            .insert("owner/alpha".to_string(), vec![pr(42, PrState::Open)]);

        let mut batch = FetchBatch::default();
        batch
            .pr_fetches
            .insert("owner/alpha".to_string(), PrFetch::RateLimited);

        let before = state.pr_status.clone();
        reconcile(&mut state, &batch, Utc::now());

        assert_eq!(state.pr_status.len(), before.len());
        assert_eq!(state.pr_status["owner/alpha"][0].number, 42);
    }

    #[test]
    fn test_rate_limited_with_no_previous_stays_absent() {
        let mut state = PersistedState::default();
        let mut batch = FetchBatch::default();
        batch
            .pr_fetches
            .insert("owner/alpha".to_string(), PrFetch::RateLimited);

        reconcile(&mut state, &batch, Utc::now());
        assert!(!state.pr_status.contains_key("owner/alpha"));
    }

    #[test]
    fn test_empty_fetch_overwrites_previous() {
        let mut state = PersistedState::default();
        state
            .pr_status
            .insert("owner/alpha".to_string(), vec![pr(42, PrState::Open)]);

        let mut batch = FetchBatch::default();
        batch
            .pr_fetches
            .insert("owner/alpha".to_string(), PrFetch::Fetched(vec![]));

        reconcile(&mut state, &batch, Utc::now());

        // A valid empty result means "no PRs", which is not "unknown"
        assert_eq!(state.pr_status["owner/alpha"].len(), 0);
    }

    #[test]
    fn test_unfetched_repos_keep_previous_entry() {
        let mut state = PersistedState::default();
        state
            .pr_status
            .insert("owner/old".to_string(), vec![pr(3, PrState::Merged)]);

        let mut batch = FetchBatch::default();
        batch
            .pr_fetches
            .insert("owner/new".to_string(), PrFetch::Fetched(vec![pr(8, PrState::Open)]));

        reconcile(&mut state, &batch, Utc::now());

        assert_eq!(state.pr_status["owner/old"][0].number, 3);
        assert_eq!(state.pr_status["owner/new"][0].number, 8);
    }

    #[test]
    fn test_merge_pr_status_policy() {
        let prev = vec![pr(1, PrState::Open)];
        let fresh = vec![pr(2, PrState::Merged)];

        assert_eq!(
            merge_pr_status(Some(prev.clone()), &PrFetch::RateLimited)
                .unwrap()[0]
                .number,
            1
        );
        assert!(merge_pr_status(None, &PrFetch::RateLimited).is_none());
        assert_eq!(
            merge_pr_status(Some(prev), &PrFetch::Fetched(fresh))
                .unwrap()[0]
                .number,
            2
        );
    }

    #[test]
    fn test_release_status_replaced_wholesale() {
        let mut state = PersistedState::default();
        state
            .release_status
            .insert("alpha".to_string(), ReleaseCheck::failed("HTTP 503"));

        let mut batch = FetchBatch::default();
        batch.release_checks.insert("alpha".to_string(), released_check());

        reconcile(&mut state, &batch, Utc::now());

        let check = &state.release_status["alpha"];
        assert!(check.released);
        assert!(check.error.is_none());
    }
}
