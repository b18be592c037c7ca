//! Streams the remote blocklist file, parses it, and inserts every
//! accepted domain into the shared [`DomainIndex`].
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::StreamExt;
use parking_lot::RwLock;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::blocking::index::DomainIndex;
use crate::blocking::lookup::normalize;
use crate::blocking::overrides::OverridesStore;
use crate::blocking::parser;
use crate::error::{BlockerError, Result};

/// Maximum bytes a single line may occupy before it's dropped as malformed.
const MAX_LINE_LEN: usize = 1024;

/// No stream bytes within this window aborts the load as a stall.
const READ_INACTIVITY_TIMEOUT: Duration = Duration::from_secs(10);

/// Progress checkpoints are published every this many input lines.
const PROGRESS_CHECKPOINT_LINES: u64 = 1000;

/// Receives human-readable progress text published during a load — the
/// loader's only coupling to the admin interface, so the admin side (not
/// the loader) owns the `loadProg` key it writes to.
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: &str);
}

pub struct LoaderLimits {
    pub max_domains: usize,
    pub max_domain_len: usize,
}

#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub inserted: usize,
    pub duplicates: u64,
    pub lines_processed: u64,
    pub stopped_early: bool,
}

pub struct BlocklistLoader {
    client: reqwest::Client,
    read_inactivity_timeout: Duration,
}

impl BlocklistLoader {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        BlocklistLoader { client, read_inactivity_timeout: READ_INACTIVITY_TIMEOUT }
    }

    /// Test-only hook to exercise the inactivity-timeout path without
    /// waiting out the real timeout.
    #[cfg(test)]
    fn with_inactivity_timeout(timeout: Duration) -> Self {
        let mut loader = Self::new();
        loader.read_inactivity_timeout = timeout;
        loader
    }

    /// Wipe `index`, stream `url` into it, then replay `overrides`. The
    /// index is left with whatever was inserted before any abort
    /// condition fires — a stop flag, a cap, or a stall all leave a
    /// serviceable partial index rather than rolling back.
    ///
    /// `index`'s write lock is taken and released per insert, never held
    /// across an `.await`, so `contains`/`classify` reads stay available to
    /// other tasks for the whole duration of a reload.
    pub async fn load(
        &self,
        url: &str,
        limits: &LoaderLimits,
        index: &RwLock<DomainIndex>,
        overrides: &OverridesStore,
        stop: Arc<AtomicBool>,
        progress: &dyn ProgressSink,
    ) -> Result<LoadOutcome> {
        index.write().clear();

        let response = self.client.get(url).send().await.map_err(|e| {
            BlockerError::NetworkUnreachable(e.to_string())
        })?;

        if !response.status().is_success() && response.status().as_u16() != 301 {
            return Err(BlockerError::ProtocolError {
                status: response.status().as_u16(),
                detail: response.status().to_string(),
            });
        }

        let content_length = response.content_length().unwrap_or(0);
        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        let mut leftover = Vec::new();
        let mut outcome = LoadOutcome::default();

        'outer: loop {
            if stop.load(Ordering::Relaxed) {
                outcome.stopped_early = true;
                progress.report("Stopped");
                break;
            }

            let chunk = match timeout(self.read_inactivity_timeout, stream.next()).await {
                Ok(Some(Ok(bytes))) => bytes,
                Ok(Some(Err(e))) => return Err(BlockerError::NetworkUnreachable(e.to_string())),
                Ok(None) => break,
                Err(_) => {
                    progress.report("Failed");
                    return Err(BlockerError::NetworkUnreachable(
                        "no stream bytes within inactivity timeout".into(),
                    ));
                }
            };

            downloaded += chunk.len() as u64;
            leftover.extend_from_slice(&chunk);

            while let Some(pos) = leftover.iter().position(|&b| b == b'\n') {
                let mut line_bytes: Vec<u8> = leftover.drain(..=pos).collect();
                line_bytes.pop(); // trailing '\n'
                let truncated_len = line_bytes.len().min(MAX_LINE_LEN);
                let line = String::from_utf8_lossy(&line_bytes[..truncated_len]);

                outcome.lines_processed += 1;

                if let Some(raw) = parser::parse_line(&line) {
                    if let Some(domain) = normalize(raw, limits.max_domain_len) {
                        if index.write().insert(&domain) {
                            outcome.inserted += 1;
                        } else {
                            outcome.duplicates += 1;
                        }
                    }
                }

                if outcome.lines_processed % PROGRESS_CHECKPOINT_LINES == 0 {
                    if stop.load(Ordering::Relaxed) {
                        outcome.stopped_early = true;
                        progress.report("Stopped");
                        break 'outer;
                    }
                    let (len, remaining) = {
                        let guard = index.read();
                        (guard.len(), guard.remaining_capacity())
                    };
                    if len >= limits.max_domains {
                        info!("domain cap reached at {} entries, stopping load", len);
                        break 'outer;
                    }
                    if remaining < MAX_LINE_LEN {
                        warn!("arena storage nearly exhausted, truncating load");
                        break 'outer;
                    }
                    let pct = if content_length > 0 {
                        100.0 * downloaded as f64 / (downloaded + content_length.saturating_sub(downloaded)) as f64
                    } else {
                        0.0
                    };
                    let text = format!("{:.1}%", pct);
                    debug!("blocklist load progress: {}", text);
                    progress.report(&text);
                }
            }
        }

        if !outcome.stopped_early {
            overrides.replay(index).await?;
            progress.report("Complete");
        }

        Ok(outcome)
    }
}

impl Default for BlocklistLoader {
    fn default() -> Self {
        Self::new()
    }
}
