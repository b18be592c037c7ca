//! Process-lifetime configuration, read once at startup from CLI args and
//! environment variables.
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;

use crate::constants::{DEFAULT_DNS_PORT, DEFAULT_HTTP_PORT};
use crate::error::{BlockerError, Result};

#[derive(Parser, Debug, Clone)]
#[command(name = "adblock-dns", about = "Network-wide ad and tracker blocking DNS responder")]
pub struct Cli {
    #[arg(long, env = "BLOCKER_BIND_ADDR")]
    pub bind_addr: Option<SocketAddr>,

    #[arg(long, env = "BLOCKER_HTTP_BIND_ADDR")]
    pub http_bind_addr: Option<SocketAddr>,

    #[arg(long, env = "BLOCKER_OVERRIDES_PATH")]
    pub overrides_path: Option<PathBuf>,

    #[arg(long, env = "BLOCKER_ARENA_DOMAINS")]
    pub arena_domains: Option<usize>,

    #[arg(long, env = "BLOCKER_ARENA_STORAGE_BYTES")]
    pub arena_storage_bytes: Option<usize>,

    #[arg(long, env = "BLOCKER_BLOCKLIST_URL")]
    pub blocklist_url: Option<String>,

    #[arg(long, env = "BLOCKER_UPSTREAM_PRIMARY")]
    pub upstream_primary: Option<Ipv4Addr>,

    #[arg(long, env = "BLOCKER_UPSTREAM_SECONDARY")]
    pub upstream_secondary: Option<Ipv4Addr>,

    #[arg(long, env = "BLOCKER_ALARM_HOUR")]
    pub alarm_hour: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct StaticConfig {
    pub dns_bind_addr: SocketAddr,
    pub http_bind_addr: SocketAddr,
    pub overrides_path: PathBuf,
    pub arena_max_domains: usize,
    pub arena_storage_bytes: usize,
    pub initial_blocklist_url: Option<String>,
    pub upstream_primary: Ipv4Addr,
    pub upstream_secondary: Ipv4Addr,
    pub alarm_hour: u32,
}

impl StaticConfig {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let dns_bind_addr = cli
            .bind_addr
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], DEFAULT_DNS_PORT)));
        let http_bind_addr = cli
            .http_bind_addr
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], DEFAULT_HTTP_PORT)));
        let overrides_path = cli
            .overrides_path
            .unwrap_or_else(|| PathBuf::from("data/custom.txt"));
        let arena_max_domains = cli.arena_domains.unwrap_or(200_000);
        let arena_storage_bytes = cli.arena_storage_bytes.unwrap_or(8 * 1024 * 1024);
        let alarm_hour = cli.alarm_hour.unwrap_or(4);

        if alarm_hour > 23 {
            return Err(BlockerError::Config(format!(
                "alarm_hour must be 0-23, got {alarm_hour}"
            )));
        }

        Ok(StaticConfig {
            dns_bind_addr,
            http_bind_addr,
            overrides_path,
            arena_max_domains,
            arena_storage_bytes,
            initial_blocklist_url: cli.blocklist_url,
            upstream_primary: cli.upstream_primary.unwrap_or(Ipv4Addr::new(1, 1, 1, 1)),
            upstream_secondary: cli.upstream_secondary.unwrap_or(Ipv4Addr::new(8, 8, 8, 8)),
            alarm_hour,
        })
    }
}
