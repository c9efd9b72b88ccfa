///! Marker splicing
///!
///! Replaces the text between a fixed begin/end marker pair in a larger
///! document (the profile README) with a freshly rendered fragment.
///! Missing markers are a warning and a no-op, never a fatal error.

use std::path::Path;

use anyhow::{Context, Result};

/// Replace everything between `begin` and `end` (markers kept) with
/// `fragment`. Returns `None` when either marker is absent or out of
/// order.
pub fn splice_between_markers(
    document: &str,
    begin: &str,
    end: &str,
    fragment: &str,
) -> Option<String> {
    let begin_idx = document.find(begin)?;
    let after_begin = begin_idx + begin.len();
    let end_rel = document[after_begin..].find(end)?;
    let end_idx = after_begin + end_rel;

    let mut out = String::with_capacity(document.len() + fragment.len());
    out.push_str(&document[..after_begin]);
    out.push('\n');
    out.push_str(fragment.trim_end_matches('\n'));
    out.push('\n');
    out.push_str(&document[end_idx..]);
    Some(out)
}

/// Splice `fragment` into the file at `path`. Returns whether the file
/// was actually rewritten.
pub async fn splice_file(path: &Path, begin: &str, end: &str, fragment: &str) -> Result<bool> {
    let document = tokio::fs::read_to_string(path)
        .await
        .context(format!("Failed to read splice target: {:?}", path))?;

    match splice_between_markers(&document, begin, end, fragment) {
        Some(updated) => {
            tokio::fs::write(path, updated)
                .await
                .context(format!("Failed to write splice target: {:?}", path))?;
            tracing::info!("Updated badge section in {:?}", path);
            Ok(true)
        }
        None => {
            tracing::warn!(
                "Markers {:?}/{:?} not found in {:?}, leaving file untouched",
                begin,
                end,
                path
            );
            Ok(false)
        }
    }
}
