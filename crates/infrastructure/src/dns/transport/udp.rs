//! UDP Transport for DNS queries (RFC 1035 §4.2.1)
//!
//! Messages are sent as-is (no framing). One socket per address family is
//! kept for the lifetime of the resolver; the IPv6 one is bound on first use.

use super::DatagramSocket;
use async_trait::async_trait;
use ferrous_lookup_domain::DomainError;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;
use tokio::sync::OnceCell;
use tracing::debug;

pub struct UdpTransport {
    v4: UdpSocket,
    v6: OnceCell<UdpSocket>,
}

impl UdpTransport {
    /// Bind the IPv4 socket to an ephemeral port.
    pub async fn bind() -> Result<Self, DomainError> {
        let v4 = bind_ephemeral(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))).await?;
        Ok(Self {
            v4,
            v6: OnceCell::new(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, DomainError> {
        self.v4
            .local_addr()
            .map_err(|e| DomainError::transport("local socket", e))
    }

    async fn socket_for(&self, server: SocketAddr) -> Result<&UdpSocket, DomainError> {
        if server.is_ipv4() {
            return Ok(&self.v4);
        }
        self.v6
            .get_or_try_init(|| bind_ephemeral(SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))))
            .await
    }
}

async fn bind_ephemeral(addr: SocketAddr) -> Result<UdpSocket, DomainError> {
    let socket = UdpSocket::bind(addr)
        .await
        .map_err(|e| DomainError::transport(addr, format!("failed to bind UDP socket: {}", e)))?;
    debug!(local = ?socket.local_addr().ok(), "UDP socket bound");
    Ok(socket)
}

#[async_trait]
impl DatagramSocket for UdpTransport {
    async fn send_to(&self, message_bytes: &[u8], server: SocketAddr) -> Result<(), DomainError> {
        let socket = self.socket_for(server).await?;
        let bytes_sent = socket
            .send_to(message_bytes, server)
            .await
            .map_err(|e| DomainError::transport(server, e))?;

        debug!(server = %server, bytes_sent, "UDP query sent");
        Ok(())
    }

    async fn recv_from(
        &self,
        server: SocketAddr,
        buf: &mut [u8],
    ) -> Result<(usize, SocketAddr), DomainError> {
        let socket = self.socket_for(server).await?;
        let (bytes_received, from) = socket
            .recv_from(buf)
            .await
            .map_err(|e| DomainError::transport(server, e))?;

        debug!(from = %from, bytes_received, "UDP datagram received");
        Ok((bytes_received, from))
    }
}
