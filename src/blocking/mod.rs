//! Wires the domain index, blocklist loader, and overrides store into a
//! single component the DNS serving loop and the admin interface both
//! close over: one `AdBlocker` value built at startup, no process-wide
//! statics.
pub mod index;
pub mod loader;
pub mod lookup;
pub mod overrides;
pub mod parser;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use tokio::sync::Mutex as AsyncMutex;

use crate::error::Result;
use index::DomainIndex;
use loader::{BlocklistLoader, LoaderLimits, LoadOutcome, ProgressSink};
use overrides::OverridesStore;

pub struct AdBlocker {
    index: RwLock<DomainIndex>,
    overrides: OverridesStore,
    loader: BlocklistLoader,
    last_blocked: Mutex<Option<String>>,
    stop_load: Arc<AtomicBool>,
    downloading: AsyncMutex<()>,
    max_domain_len: usize,
}

impl AdBlocker {
    pub fn new(
        max_domains: usize,
        storage_bytes: usize,
        max_domain_len: usize,
        overrides_path: impl Into<std::path::PathBuf>,
    ) -> Self {
        AdBlocker {
            index: RwLock::new(DomainIndex::new(max_domains, storage_bytes)),
            overrides: OverridesStore::new(overrides_path),
            loader: BlocklistLoader::new(),
            last_blocked: Mutex::new(None),
            stop_load: Arc::new(AtomicBool::new(false)),
            downloading: AsyncMutex::new(()),
            max_domain_len,
        }
    }

    pub fn max_domain_len(&self) -> usize {
        self.max_domain_len
    }

    /// Classify `name` for the hot DNS path. Consults a single-entry
    /// last-blocked cache before touching the sorted index.
    pub fn classify(&self, name: &str) -> bool {
        {
            let last = self.last_blocked.lock();
            if last.as_deref() == Some(name) {
                return true;
            }
        }
        let blocked = self.index.read().contains(name);
        if blocked {
            *self.last_blocked.lock() = Some(name.to_string());
        }
        blocked
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.read().contains(name)
    }

    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn duplicates(&self) -> u64 {
        self.index.read().duplicates()
    }

    /// Reload the index from `url`. Serializes against concurrent reloads
    /// via `downloading`; resets the stop flag before the run so a prior
    /// stop doesn't poison the next one.
    pub async fn reload(&self, url: &str, limits: &LoaderLimits, progress: &dyn ProgressSink) -> Result<LoadOutcome> {
        let _guard = self.downloading.lock().await;
        self.stop_load.store(false, Ordering::Relaxed);

        // The loader takes the RwLock itself and re-acquires it per insert,
        // so classify()/contains() reads stay available for the whole
        // duration of the download rather than blocking until it finishes.
        self.loader
            .load(url, limits, &self.index, &self.overrides, self.stop_load.clone(), progress)
            .await
    }

    pub fn request_stop(&self) {
        self.stop_load.store(true, Ordering::Relaxed);
    }

    /// `uLoad`: caller is responsible for checking the domain resolves
    /// upstream before calling this; the index itself admits anything.
    pub async fn add_override(&self, name: &str) -> Result<bool> {
        let inserted = self.index.write().insert(name);
        if inserted {
            self.overrides.append(name, false).await?;
        }
        Ok(inserted)
    }

    pub async fn remove_override(&self, name: &str) -> Result<bool> {
        let deleted = self.index.write().delete(name);
        if deleted {
            self.overrides.append(name, true).await?;
        }
        Ok(deleted)
    }

    pub async fn clear_overrides(&self) -> Result<()> {
        self.overrides.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_remembers_last_blocked_without_reindexing() {
        let blocker = AdBlocker::new(100, 4096, 64, std::env::temp_dir().join("unused-overrides.txt"));
        blocker.index.write().insert("ads.example.com");
        assert!(blocker.classify("ads.example.com"));
        assert!(blocker.classify("ads.example.com"));
        assert!(!blocker.classify("safe.example.com"));
    }

    #[tokio::test]
    async fn add_and_remove_override_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = AdBlocker::new(100, 4096, 64, dir.path().join("custom.txt"));
        assert!(blocker.add_override("new.bad").await.unwrap());
        assert!(blocker.contains("new.bad"));
        assert!(blocker.remove_override("new.bad").await.unwrap());
        assert!(!blocker.contains("new.bad"));
    }
}
