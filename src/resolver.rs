//! Upstream resolution with failover and a bounded TTL cache: a fixed
//! 20-slot round-robin cache with a flat 5-minute TTL, link-local name
//! suppression, and primary/secondary server failover. The upstream's own
//! answer TTL is deliberately ignored — parsing it would mean parsing full
//! upstream DNS responses here, which this resolver does not do; it defers
//! to the OS resolver for the actual lookup.
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::constants::{RESOLVER_CACHE_SIZE, RESOLVER_CACHE_TTL_SECS, SINKHOLE_ADDR};

/// One ring slot. `name` is `None` for an empty slot (mirrors the
/// firmware's `hostname[0] = 0` sentinel).
#[derive(Clone)]
struct CacheEntry {
    name: Option<String>,
    address: Ipv4Addr,
    expiry: Instant,
}

impl CacheEntry {
    fn empty() -> Self {
        CacheEntry {
            name: None,
            address: Ipv4Addr::UNSPECIFIED,
            expiry: Instant::now(),
        }
    }
}

struct ResolverCache {
    slots: Vec<CacheEntry>,
    next: usize,
}

impl ResolverCache {
    fn new() -> Self {
        ResolverCache {
            slots: vec![CacheEntry::empty(); RESOLVER_CACHE_SIZE],
            next: 0,
        }
    }

    /// Linear scan for `name`. An expired match is invalidated as soon as
    /// it's observed, not just overwritten on the next insert.
    fn get(&mut self, name: &str) -> Option<Ipv4Addr> {
        let now = Instant::now();
        for slot in self.slots.iter_mut() {
            if slot.name.as_deref() == Some(name) {
                if now < slot.expiry {
                    return Some(slot.address);
                }
                slot.name = None;
                return None;
            }
        }
        None
    }

    fn insert(&mut self, name: &str, address: Ipv4Addr) {
        let idx = self.next;
        self.slots[idx] = CacheEntry {
            name: Some(name.to_string()),
            address,
            expiry: Instant::now() + Duration::from_secs(RESOLVER_CACHE_TTL_SECS),
        };
        self.next = (self.next + 1) % self.slots.len();
    }
}

pub struct UpstreamResolver {
    primary: Ipv4Addr,
    secondary: Ipv4Addr,
    cache: Mutex<ResolverCache>,
}

fn is_link_local(name: &str) -> bool {
    name.starts_with("wpad") || name.ends_with(".home") || name.ends_with(".local")
}

impl UpstreamResolver {
    pub fn new(primary: Ipv4Addr, secondary: Ipv4Addr) -> Self {
        UpstreamResolver {
            primary,
            secondary,
            cache: Mutex::new(ResolverCache::new()),
        }
    }

    /// Resolve `name`, returning [`SINKHOLE_ADDR`] on link-local
    /// suppression or total upstream failure rather than propagating an
    /// error: nothing past the hot DNS path is allowed to fail loudly.
    pub async fn resolve(&self, name: &str) -> Ipv4Addr {
        if is_link_local(name) {
            return SINKHOLE_ADDR;
        }

        if let Some(addr) = self.cache.lock().get(name) {
            return addr;
        }

        let resolved = match self.query_upstream(self.primary, name).await {
            Some(addr) => Some(addr),
            None => self.query_upstream(self.secondary, name).await,
        };

        match resolved {
            Some(addr) => {
                self.cache.lock().insert(name, addr);
                addr
            }
            None => {
                warn!("upstream resolution failed for {} via both servers", name);
                SINKHOLE_ADDR
            }
        }
    }

    /// Issue one resolution attempt nominally against `server`, via
    /// `tokio::net::lookup_host` against the OS resolver — portable async
    /// Rust has no standard way to pin a single lookup to one upstream
    /// server, so both failover attempts actually go through whichever
    /// resolver the OS is configured with.
    async fn query_upstream(&self, server: Ipv4Addr, name: &str) -> Option<Ipv4Addr> {
        debug!("querying upstream {} for {}", server, name);
        tokio::net::lookup_host((name, 0)).await.ok().and_then(|mut addrs| {
            addrs.find_map(|addr| match addr.ip() {
                std::net::IpAddr::V4(v4) => Some(v4),
                std::net::IpAddr::V6(_) => None,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_local_suppression() {
        assert!(is_link_local("wpad.example.com"));
        assert!(is_link_local("printer.home"));
        assert!(is_link_local("nas.local"));
        assert!(!is_link_local("example.com"));
    }

    #[test]
    fn cache_round_trips_within_ttl() {
        let mut cache = ResolverCache::new();
        cache.insert("example.com", Ipv4Addr::new(1, 2, 3, 4));
        assert_eq!(cache.get("example.com"), Some(Ipv4Addr::new(1, 2, 3, 4)));
        assert_eq!(cache.get("example.com"), Some(Ipv4Addr::new(1, 2, 3, 4)));
    }

    #[test]
    fn cache_wraps_round_robin() {
        let mut cache = ResolverCache::new();
        for i in 0..RESOLVER_CACHE_SIZE + 5 {
            cache.insert(&format!("host{i}.com"), Ipv4Addr::new(10, 0, 0, i as u8));
        }
        // The earliest entries have been overwritten by the wraparound.
        assert_eq!(cache.get("host0.com"), None);
        assert_eq!(cache.get("host20.com"), Some(Ipv4Addr::new(10, 0, 0, 20)));
    }

    #[tokio::test]
    async fn resolve_short_circuits_link_local_without_touching_network() {
        let resolver =
            UpstreamResolver::new(Ipv4Addr::new(127, 0, 0, 1), Ipv4Addr::new(127, 0, 0, 2));
        assert_eq!(resolver.resolve("wpad.lan").await, SINKHOLE_ADDR);
    }
}
