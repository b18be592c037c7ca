//! Admin interface state: the configuration keys and commands published
//! for operator control. Holds the counters, progress text, and command
//! handlers behind a [`parking_lot::RwLock`]; the HTTP layer in
//! [`crate::http_server`] is a thin translation of requests onto this type.
use std::net::Ipv4Addr;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::blocking::AdBlocker;
use crate::blocking::loader::{LoaderLimits, ProgressSink};
use crate::blocking::lookup::normalize;
use crate::error::{BlockerError, Result};
use crate::metrics::DnsMetrics;
use crate::resolver::UpstreamResolver;

/// Mutable admin-visible settings that aren't counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSettings {
    pub file_url_current: String,
    pub file_url_new: String,
    pub max_domains: usize,
    pub min_memory_bytes: usize,
    pub max_dom_len: usize,
    pub alarm_hour: u32,
    pub ns1: Ipv4Addr,
    pub ns2: Ipv4Addr,
}

struct ProgressText(RwLock<String>);

impl ProgressSink for ProgressText {
    fn report(&self, progress: &str) {
        *self.0.write() = progress.to_string();
    }
}

pub struct AdminState {
    pub blocker: Arc<AdBlocker>,
    pub resolver: Arc<UpstreamResolver>,
    metrics: Arc<DnsMetrics>,
    settings: RwLock<AdminSettings>,
    progress: Arc<ProgressText>,
}

impl AdminState {
    pub fn new(blocker: Arc<AdBlocker>, resolver: Arc<UpstreamResolver>, metrics: Arc<DnsMetrics>, settings: AdminSettings) -> Self {
        AdminState {
            blocker,
            resolver,
            metrics,
            settings: RwLock::new(settings),
            progress: Arc::new(ProgressText(RwLock::new("Idle".to_string()))),
        }
    }

    pub fn settings(&self) -> AdminSettings {
        self.settings.read().clone()
    }

    pub fn progress(&self) -> String {
        self.progress.0.read().clone()
    }

    pub fn record_blocked(&self) {
        self.metrics.record_blocked();
    }

    pub fn record_allowed(&self) {
        self.metrics.record_allowed();
    }

    pub fn block_count(&self) -> u64 {
        self.metrics.block_count()
    }

    pub fn allow_count(&self) -> u64 {
        self.metrics.allow_count()
    }

    fn loader_limits(&self) -> LoaderLimits {
        let settings = self.settings.read();
        LoaderLimits { max_domains: settings.max_domains, max_domain_len: settings.max_dom_len }
    }

    /// `uLoad`: only admitted if `domain` resolves upstream.
    pub async fn u_load(&self, domain: &str) -> Result<bool> {
        let max_len = self.blocker.max_domain_len();
        let name = normalize(domain, max_len)
            .ok_or_else(|| BlockerError::Config(format!("domain rejected by normalizer: {domain}")))?;
        let resolved = self.resolver.resolve(&name).await;
        if resolved == crate::constants::SINKHOLE_ADDR {
            return Ok(false);
        }
        self.blocker.add_override(&name).await
    }

    /// `vLoad`: delete and tombstone, no upstream check required.
    pub async fn v_load(&self, domain: &str) -> Result<bool> {
        let max_len = self.blocker.max_domain_len();
        let name = normalize(domain, max_len)
            .ok_or_else(|| BlockerError::Config(format!("domain rejected by normalizer: {domain}")))?;
        self.blocker.remove_override(&name).await
    }

    /// `wLoad`: membership check only, no mutation.
    pub fn w_load(&self, domain: &str) -> bool {
        let max_len = self.blocker.max_domain_len();
        match normalize(domain, max_len) {
            Some(name) => self.blocker.contains(&name),
            None => false,
        }
    }

    /// `zLoad`: reload, optionally persisting a new `fileURLc` first.
    pub async fn z_load(&self, url: Option<&str>) -> Result<()> {
        if let Some(url) = url {
            self.settings.write().file_url_current = url.to_string();
        }
        let target = self.settings.read().file_url_current.clone();
        if target.is_empty() {
            return Err(BlockerError::Config("no blocklist URL configured".into()));
        }
        info!("admin triggered reload of {}", target);
        let limits = self.loader_limits();
        let sink = self.progress.clone();
        self.blocker.reload(&target, &limits, sink.as_ref()).await?;
        Ok(())
    }

    /// `xStop`: request the in-flight loader to stop at its next checkpoint.
    pub fn x_stop(&self) {
        self.blocker.request_stop();
    }

    /// `zzCustom`: wipe the overrides file.
    pub async fn zz_custom(&self) -> Result<()> {
        self.blocker.clear_overrides().await
    }
}
