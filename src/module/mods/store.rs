///! Persisted state I/O
///!
///! The state document is read once at startup and written exactly once
///! after the whole batch has been reconciled, so a crash mid-run never
///! corrupts the previous document.

use std::path::Path;

use anyhow::{Context, Result};

use super::types::PersistedState;

/// Load the state document from disk
pub async fn load(path: &Path) -> Result<PersistedState> {
    let content = tokio::fs::read_to_string(path)
        .await
        .context(format!("Failed to read state file: {:?}", path))?;
    let state: PersistedState =
        serde_json::from_str(&content).context("Failed to deserialize state file")?;
    Ok(state)
}

/// Write the state document back, pretty-printed with a trailing newline
pub async fn save(path: &Path, state: &PersistedState) -> Result<()> {
    let json = serde_json::to_string_pretty(state).context("Failed to serialize state")?;
    tokio::fs::write(path, json + "\n")
        .await
        .context(format!("Failed to write state file: {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::mods::types::{ModBuckets, ModRecord};

    fn sample_mod(name: &str, slug: &str) -> ModRecord {
        ModRecord {
            name: name.to_string(),
            repo: Some(format!("owner/{}", slug)),
            description: "A test mod".to_string(),
            role: "Author".to_string(),
            tags: vec!["Utility".to_string()],
            migration: None,
            target_version: Some("1.21".to_string()),
            curseforge_id: 1234,
            curseforge_slug: slug.to_string(),
            downloads: None,
        }
    }

    #[tokio::test]
    async fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mods.json");

        let state = PersistedState {
            mods: ModBuckets {
                active: vec![sample_mod("Alpha", "alpha")],
                in_development: vec![sample_mod("Beta", "beta")],
                released: vec![],
            },
            ..Default::default()
        };

        save(&path, &state).await.unwrap();
        let loaded = load(&path).await.unwrap();

        assert_eq!(loaded.mods.active.len(), 1);
        assert_eq!(loaded.mods.in_development[0].curseforge_slug, "beta");
        assert!(loaded.last_updated.is_none());

        // Written document ends with a newline (kept diff-friendly)
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_load_tolerates_missing_maps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mods.json");
        std::fs::write(
            &path,
            r#"{"mods":{"active":[],"in_development":[],"released":[]}}"#,
        )
        .unwrap();

        let loaded = load(&path).await.unwrap();
        assert!(loaded.pr_status.is_empty());
        assert!(loaded.release_status.is_empty());
    }
}
