use std::sync::Arc;
use std::time::Duration;

use adblock_dns::admin::{AdminSettings, AdminState};
use adblock_dns::blocking::AdBlocker;
use adblock_dns::blocking::loader::{LoaderLimits, ProgressSink};
use adblock_dns::config::{Cli, StaticConfig};
use adblock_dns::http_server::HttpServer;
use adblock_dns::metrics::DnsMetrics;
use adblock_dns::resolver::UpstreamResolver;
use adblock_dns::scheduler::Scheduler;
use adblock_dns::server::run_udp_server;

use chrono::Local;
use clap::Parser;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

struct LogProgress;
impl ProgressSink for LogProgress {
    fn report(&self, progress: &str) {
        info!("blocklist load progress: {}", progress);
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match StaticConfig::from_cli(cli) {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let blocker = Arc::new(AdBlocker::new(
        config.arena_max_domains,
        config.arena_storage_bytes,
        64,
        config.overrides_path.clone(),
    ));
    let resolver = Arc::new(UpstreamResolver::new(config.upstream_primary, config.upstream_secondary));
    let metrics = Arc::new(DnsMetrics::new().expect("failed to build metrics registry"));

    let settings = AdminSettings {
        file_url_current: config.initial_blocklist_url.clone().unwrap_or_default(),
        file_url_new: String::new(),
        max_domains: config.arena_max_domains,
        min_memory_bytes: 0,
        max_dom_len: 64,
        alarm_hour: config.alarm_hour,
        ns1: config.upstream_primary,
        ns2: config.upstream_secondary,
    };
    let admin = Arc::new(AdminState::new(blocker.clone(), resolver.clone(), metrics.clone(), settings));

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    // The admin HTTP interface has to be reachable before we can wait on it
    // to supply a blocklist URL, so it's spawned first.
    let http_handle = {
        let http_server = HttpServer::new(admin.clone(), metrics.clone(), config.http_bind_addr);
        tokio::spawn(async move {
            if let Err(e) = http_server.run().await {
                error!("admin HTTP server exited: {}", e);
            }
        })
    };

    // If no URL was configured at startup, block here and poll the admin
    // state until zLoad supplies one, rather than serving with an empty
    // index. zLoad itself triggers the reload, so once the poll observes a
    // non-empty URL there is nothing left for us to load ourselves.
    match &config.initial_blocklist_url {
        Some(url) => {
            let limits = LoaderLimits { max_domains: config.arena_max_domains, max_domain_len: 64 };
            info!("performing initial blocklist load from {}", url);
            if let Err(e) = blocker.reload(url, &limits, &LogProgress).await {
                error!("initial blocklist load failed: {}", e);
            }
        }
        None => {
            warn!("no blocklist URL configured at startup; waiting for one via the admin interface (zLoad)");
            let mut poll = tokio::time::interval(Duration::from_secs(1));
            loop {
                poll.tick().await;
                if !admin.settings().file_url_current.is_empty() {
                    info!("blocklist URL supplied via admin interface, proceeding with startup");
                    break;
                }
            }
        }
    }

    let dns_handle = {
        let admin = admin.clone();
        let shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(async move {
            if let Err(e) = run_udp_server(config.dns_bind_addr, admin, shutdown_rx).await {
                error!("DNS server exited: {}", e);
            }
        })
    };

    let scheduler_handle = {
        let blocker = blocker.clone();
        let admin = admin.clone();
        let mut shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(async move {
            let scheduler = Scheduler::new(Local::now(), config.alarm_hour);
            let mut ticker = tokio::time::interval(Duration::from_secs(60));
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = ticker.tick() => {
                        if scheduler.tick(Local::now()) {
                            let current_url = admin.settings().file_url_current;
                            if current_url.is_empty() {
                                continue;
                            }
                            let limits = LoaderLimits { max_domains: admin.settings().max_domains, max_domain_len: blocker.max_domain_len() };
                            if let Err(e) = blocker.reload(&current_url, &limits, &LogProgress).await {
                                error!("scheduled blocklist reload failed: {}", e);
                            }
                        }
                    }
                }
            }
        })
    };

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received shutdown signal"),
        Err(e) => error!("failed to listen for shutdown signal: {}", e),
    }
    let _ = shutdown_tx.send(());

    dns_handle.abort();
    http_handle.abort();
    scheduler_handle.abort();
}
