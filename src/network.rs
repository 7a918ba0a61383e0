//! UDP reachability probe.
//!
//! Sends a single marker datagram to the receiver. UDP gives no delivery
//! feedback, so success only means the local stack accepted the packet; a
//! listener on the target (e.g. `nc -ul <port>`) shows whether it arrived.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;

/// Payload of the probe datagram.
pub const PROBE_PAYLOAD: &[u8] = b"audio-streamer-test";

#[derive(Debug)]
pub enum ProbeOutcome {
    Sent(SocketAddr),
    InvalidAddress,
    BindFailed(std::io::Error),
    SendFailed(std::io::Error),
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Sent(_))
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sent(target) => write!(f, "✅ Network test packet sent successfully to {target}"),
            Self::InvalidAddress => f.write_str("❌ Invalid IP or port format"),
            Self::BindFailed(e) => write!(f, "❌ Failed to create UDP socket: {e}"),
            Self::SendFailed(e) => write!(f, "❌ Failed to send test packet: {e}"),
        }
    }
}

/// Parse user-entered `ip` and `port` into a socket address.
pub fn parse_target(ip: &str, port: &str) -> Option<SocketAddr> {
    let ip = ip.trim().parse::<IpAddr>().ok()?;
    let port = port.trim().parse::<u16>().ok()?;
    Some(SocketAddr::new(ip, port))
}

/// Send [`PROBE_PAYLOAD`] to `ip:port` from an ephemeral socket.
pub async fn probe(ip: &str, port: &str) -> ProbeOutcome {
    let Some(target) = parse_target(ip, port) else {
        return ProbeOutcome::InvalidAddress;
    };

    let bind_addr = match target {
        SocketAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
        SocketAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
    };

    let socket = match UdpSocket::bind(bind_addr).await {
        Ok(socket) => socket,
        Err(e) => return ProbeOutcome::BindFailed(e),
    };

    match socket.send_to(PROBE_PAYLOAD, target).await {
        Ok(_) => {
            tracing::debug!("sent {} byte probe to {}", PROBE_PAYLOAD.len(), target);
            ProbeOutcome::Sent(target)
        }
        Err(e) => ProbeOutcome::SendFailed(e),
    }
}
