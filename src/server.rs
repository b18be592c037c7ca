//! DNS serving loop: UDP only, every query answered from this process
//! rather than forwarded verbatim.
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::admin::AdminState;
use crate::dns::{DnsPacket, DnsResourceRecord, ResponseCode};

const MAX_UDP_PACKET_SIZE: usize = 512;

/// Run the UDP DNS server until `shutdown_rx` fires.
pub async fn run_udp_server(
    bind_addr: SocketAddr,
    admin: Arc<AdminState>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> std::io::Result<()> {
    let sock = Arc::new(UdpSocket::bind(bind_addr).await?);
    info!("DNS server listening on {}", bind_addr);

    let mut buf = [0u8; MAX_UDP_PACKET_SIZE];
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("DNS server received shutdown signal");
                break;
            }
            result = sock.recv_from(&mut buf) => {
                let (len, src) = result?;
                let query_bytes = buf[..len].to_vec();
                let admin = admin.clone();
                let sock = sock.clone();
                tokio::spawn(async move {
                    if let Some(response) = handle_query(&query_bytes, &admin).await {
                        if let Err(e) = sock.send_to(&response, src).await {
                            warn!("failed to send response to {}: {}", src, e);
                        }
                    }
                });
            }
        }
    }

    Ok(())
}

async fn handle_query(buf: &[u8], admin: &AdminState) -> Option<Vec<u8>> {
    let query = match DnsPacket::parse(buf) {
        Ok(packet) => packet,
        Err(e) => {
            debug!("dropping malformed query: {}", e);
            return None;
        }
    };

    let question = query.question.as_ref()?;
    let name = question.name();

    let response = if admin.blocker.classify(&name) {
        admin.record_blocked();
        let record = DnsResourceRecord::a_record(question.labels.clone(), 0, Ipv4Addr::UNSPECIFIED);
        DnsPacket::respond(&query, ResponseCode::NoError, vec![record])
    } else {
        admin.record_allowed();
        let resolved = admin.resolver.resolve(&name).await;
        if resolved == Ipv4Addr::UNSPECIFIED {
            DnsPacket::respond(&query, ResponseCode::ServFail, vec![])
        } else {
            let record = DnsResourceRecord::a_record(question.labels.clone(), 300, resolved);
            DnsPacket::respond(&query, ResponseCode::NoError, vec![record])
        }
    };

    match response.serialize() {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!("failed to serialize response: {}", e);
            None
        }
    }
}
