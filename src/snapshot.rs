use std::path::PathBuf;

use tracing::{debug, warn};

/// File store for per-event camera snapshots.
///
/// Snapshots live under a single directory as `event_{id}.jpg` and are
/// referenced everywhere else by the URL path `/events/img/{filename}`.
/// Every failure here degrades to "no snapshot"; a frame is never rejected
/// because its image could not be written.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(e) = std::fs::create_dir_all(&dir) {
            warn!(error = ?e, dir = ?dir, "could not create snapshot directory");
        }
        Self { dir }
    }

    fn file_name(event_id: u64) -> String {
        format!("event_{event_id}.jpg")
    }

    /// Persist the image bytes for an event and return the reference URL,
    /// or `None` if the write failed.
    pub async fn save(&self, event_id: u64, image: &[u8]) -> Option<String> {
        let name = Self::file_name(event_id);
        match tokio::fs::write(self.dir.join(&name), image).await {
            Ok(()) => {
                debug!(event_id, bytes = image.len(), "stored event snapshot");
                Some(format!("/events/img/{name}"))
            }
            Err(e) => {
                warn!(error = ?e, event_id, "failed to store event snapshot");
                None
            }
        }
    }

    /// Read back a stored snapshot by filename.
    ///
    /// Only bare filenames are accepted; anything that could escape the
    /// snapshot directory is rejected as missing.
    pub async fn read(&self, name: &str) -> Option<Vec<u8>> {
        if name.is_empty() || name.contains("..") || name.contains(['/', '\\']) {
            warn!(%name, "rejected snapshot filename");
            return None;
        }
        match tokio::fs::read(self.dir.join(name)).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                debug!(error = ?e, %name, "snapshot not readable");
                None
            }
        }
    }

    #[cfg(test)]
    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn save_returns_reference_url_and_read_round_trips() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let url = store.save(7, b"jpegbytes").await.unwrap();
        assert_eq!(url, "/events/img/event_7.jpg");
        assert!(store.dir().join("event_7.jpg").is_file());
        assert_eq!(store.read("event_7.jpg").await.unwrap(), b"jpegbytes");
    }

    #[tokio::test]
    async fn missing_file_reads_as_none() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        assert!(store.read("event_99.jpg").await.is_none());
    }

    #[tokio::test]
    async fn traversal_filenames_are_rejected() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        assert!(store.read("../danger_list.json").await.is_none());
        assert!(store.read("a/b.jpg").await.is_none());
        assert!(store.read("").await.is_none());
    }

    #[tokio::test]
    async fn unwritable_directory_degrades_to_none() {
        let store = SnapshotStore::new("/proc/no-such-dir/events");
        assert!(store.save(1, b"x").await.is_none());
    }
}
