//! Append-only text file of user domain additions and tombstoned deletions,
//! replayed over the [`super::index::DomainIndex`] after each rebuild.
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tokio::fs;
use tracing::warn;

use crate::blocking::index::DomainIndex;
use crate::error::Result;

pub struct OverridesStore {
    path: PathBuf,
}

impl OverridesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        OverridesStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `name` (or `#name` for a tombstoned delete) plus a newline.
    /// Creates the file if absent.
    pub async fn append(&self, name: &str, deleted: bool) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut contents = fs::read_to_string(&self.path).await.unwrap_or_default();
        if deleted {
            contents.push('#');
        }
        contents.push_str(name);
        contents.push('\n');
        fs::write(&self.path, contents).await?;
        Ok(())
    }

    /// Replay the file over `index` in file order: tombstone lines delete,
    /// everything else inserts. Replay failures (duplicate insert, missing
    /// delete target) are logged and otherwise non-fatal.
    ///
    /// The file is read with no lock held; `index`'s write guard is taken
    /// once for the whole (synchronous) apply-lines loop.
    pub async fn replay(&self, index: &RwLock<DomainIndex>) -> Result<()> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let mut index = index.write();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(name) = line.strip_prefix('#') {
                if !index.delete(name) {
                    warn!("overrides replay: delete target {} not present", name);
                }
            } else if !index.insert(line) {
                warn!("overrides replay: insert {} was a duplicate or dropped", line);
            }
        }
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Synchronous variant used by tests that don't want a tokio runtime.
#[cfg(test)]
fn write_sync(path: &Path, contents: &str) {
    let mut f = std::fs::File::create(path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn append_creates_file_and_grows_monotonically() {
        let dir = tempdir().unwrap();
        let store = OverridesStore::new(dir.path().join("custom.txt"));

        store.append("new.bad", false).await.unwrap();
        store.append("ads.example.com", true).await.unwrap();

        let contents = fs::read_to_string(store.path()).await.unwrap();
        assert_eq!(contents, "new.bad\n#ads.example.com\n");
    }

    #[tokio::test]
    async fn replay_applies_inserts_and_tombstones_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.txt");
        write_sync(&path, "new.bad\n#ads.example.com\n");

        let index = RwLock::new(DomainIndex::new(100, 4096));
        index.write().insert("ads.example.com");

        let store = OverridesStore::new(path);
        store.replay(&index).await.unwrap();

        assert!(index.read().contains("new.bad"));
        assert!(!index.read().contains("ads.example.com"));
    }

    #[tokio::test]
    async fn replay_on_missing_file_is_a_no_op() {
        let dir = tempdir().unwrap();
        let store = OverridesStore::new(dir.path().join("missing.txt"));
        let index = RwLock::new(DomainIndex::new(100, 4096));
        store.replay(&index).await.unwrap();
        assert_eq!(index.read().len(), 0);
    }

    #[tokio::test]
    async fn clear_removes_the_file() {
        let dir = tempdir().unwrap();
        let store = OverridesStore::new(dir.path().join("custom.txt"));
        store.append("a.com", false).await.unwrap();
        store.clear().await.unwrap();
        assert!(!store.path().exists());
    }
}
