pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use bytes::Bytes;
use ferrous_lookup_domain::DomainError;
use std::net::SocketAddr;
use std::time::Duration;

pub use tcp::TcpTransport;
pub use udp::UdpTransport;

#[derive(Debug)]
pub struct TransportResponse {
    pub bytes: Bytes,
    pub protocol_used: &'static str,
}

/// One framed request/response exchange per call (DNS over TCP).
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        server: SocketAddr,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError>;

    fn protocol_name(&self) -> &'static str;
}

/// A long-lived datagram socket. Sending and receiving are decoupled so the
/// caller can discard stray datagrams and retry on its own schedule.
#[async_trait]
pub trait DatagramSocket: Send + Sync {
    async fn send_to(&self, message_bytes: &[u8], server: SocketAddr) -> Result<(), DomainError>;

    /// Wait for the next datagram on the socket used to reach `server`.
    /// Callers bound the wait with their own timeout.
    async fn recv_from(
        &self,
        server: SocketAddr,
        buf: &mut [u8],
    ) -> Result<(usize, SocketAddr), DomainError>;

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}
