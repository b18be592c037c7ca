/// Default bind port for the DNS listener. Deployment is expected to bind
/// 53 explicitly via `--bind-addr`; 1053 lets the binary run unprivileged
/// in dev.
pub const DEFAULT_DNS_PORT: u16 = 1053;

/// Default bind address for the admin HTTP interface.
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Fixed TTL applied to every cached upstream answer; the upstream's own
/// answer TTL is never parsed or honored.
pub const RESOLVER_CACHE_TTL_SECS: u64 = 300;

/// Round-robin cache slot count.
pub const RESOLVER_CACHE_SIZE: usize = 20;

/// Sinkhole address returned for every blocked domain.
pub const SINKHOLE_ADDR: std::net::Ipv4Addr = std::net::Ipv4Addr::new(0, 0, 0, 0);
