use std::collections::BTreeSet;
use std::path::Path;

use tracing::{info, warn};

/// Load the persisted blacklist.
///
/// A missing or unreadable file starts the set empty; the daemon never
/// refuses to boot over blacklist state.
pub fn load(path: &Path) -> BTreeSet<String> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = ?path, "no danger list file, starting empty");
            return BTreeSet::new();
        }
        Err(e) => {
            warn!(error = ?e, path = ?path, "could not read danger list, starting empty");
            return BTreeSet::new();
        }
    };
    match serde_json::from_slice::<Vec<String>>(&bytes) {
        Ok(names) => {
            let set: BTreeSet<String> = names.into_iter().collect();
            info!(count = set.len(), path = ?path, "loaded danger list");
            set
        }
        Err(e) => {
            warn!(error = ?e, path = ?path, "corrupt danger list, starting empty");
            BTreeSet::new()
        }
    }
}

/// Rewrite the blacklist file in full.
///
/// Writes to a sibling temp file and renames it into place so a crash
/// mid-write cannot leave a truncated list behind. Failures are logged and
/// swallowed; the in-memory set stays authoritative either way.
pub async fn persist(path: &Path, names: &[String]) {
    if let Err(e) = try_persist(path, names).await {
        warn!(error = ?e, path = ?path, "failed to persist danger list");
    }
}

async fn try_persist(path: &Path, names: &[String]) -> anyhow::Result<()> {
    let data = serde_json::to_vec_pretty(names)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &data).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn persists_and_reloads_sorted_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("danger_list.json");
        let names = vec!["alice".to_string(), "bob".to_string()];
        persist(&path, &names).await;
        assert_eq!(load(&path), names.into_iter().collect());
        // no temp file left behind
        assert!(!dir.path().join("danger_list.json.tmp").exists());
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        assert!(load(&dir.path().join("nope.json")).is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("danger_list.json");
        std::fs::write(&path, b"{not json").unwrap();
        assert!(load(&path).is_empty());
    }

    #[tokio::test]
    async fn persist_failure_is_swallowed() {
        persist(Path::new("/proc/no-such-dir/danger.json"), &["x".to_string()]).await;
    }
}
