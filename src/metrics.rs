//! Prometheus registry exposing the counters the admin interface publishes
//! as `blockCnt`/`allowCnt`. `loadProg` is a plain string, not a metric,
//! and lives on `AdminState` instead.
use prometheus::{Encoder, IntCounter, Registry, TextEncoder, opts};

pub struct DnsMetrics {
    registry: Registry,
    pub block_count: IntCounter,
    pub allow_count: IntCounter,
}

impl DnsMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let block_count = IntCounter::with_opts(opts!(
            "adblock_dns_block_count_total",
            "Total queries classified as blocked"
        ))?;
        let allow_count = IntCounter::with_opts(opts!(
            "adblock_dns_allow_count_total",
            "Total queries classified as allowed"
        ))?;

        registry.register(Box::new(block_count.clone()))?;
        registry.register(Box::new(allow_count.clone()))?;

        Ok(DnsMetrics {
            registry,
            block_count,
            allow_count,
        })
    }

    pub fn record_blocked(&self) {
        self.block_count.inc();
    }

    pub fn record_allowed(&self) {
        self.allow_count.inc();
    }

    pub fn block_count(&self) -> u64 {
        self.block_count.get()
    }

    pub fn allow_count(&self) -> u64 {
        self.allow_count.get()
    }

    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
