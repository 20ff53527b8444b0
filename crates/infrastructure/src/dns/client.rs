use super::transport::{DatagramSocket, DnsTransport};
use super::wire::{MessageBuilder, ResponseParser, HEADER_LEN};
use async_trait::async_trait;
use ferrous_lookup_application::ports::{
    NameserverClient, NoopQueryObserver, QueryObserver, QueryOutcome,
};
use ferrous_lookup_domain::{DnsMessage, DomainError, Question, ResolverConfig};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Talks to authoritative servers over a shared UDP socket, retrying on
/// timeout and falling back to TCP for truncated replies.
pub struct UdpNameserverClient {
    socket: Arc<dyn DatagramSocket>,
    stream: Arc<dyn DnsTransport>,
    observer: Arc<dyn QueryObserver>,
    port: u16,
    timeout: Duration,
    max_attempts: u32,
    buffer_size: usize,
    tcp_fallback: bool,
    // Serializes exchanges so concurrent lookups do not read each other's
    // replies off the shared socket.
    exchange_lock: Mutex<()>,
}

enum Received {
    Message(DnsMessage),
    TimedOut,
    Malformed,
}

impl UdpNameserverClient {
    pub fn new(
        socket: Arc<dyn DatagramSocket>,
        stream: Arc<dyn DnsTransport>,
        config: &ResolverConfig,
    ) -> Self {
        Self {
            socket,
            stream,
            observer: Arc::new(NoopQueryObserver),
            port: config.dns_port,
            timeout: config.query_timeout(),
            max_attempts: config.max_query_attempts,
            buffer_size: config.udp_buffer_size,
            tcp_fallback: config.tcp_fallback,
            exchange_lock: Mutex::new(()),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn QueryObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Wait until `deadline` for a reply carrying `id`. Datagrams from other
    /// hosts, with another ID, or without QR set are skipped without ending
    /// the wait.
    async fn receive_matching(
        &self,
        server: SocketAddr,
        id: u16,
        deadline: Instant,
        buf: &mut [u8],
    ) -> Result<Received, DomainError> {
        loop {
            let received =
                tokio::time::timeout_at(deadline, self.socket.recv_from(server, buf)).await;
            let (len, from) = match received {
                Ok(result) => result?,
                Err(_) => return Ok(Received::TimedOut),
            };

            if from != server {
                debug!(expected = %server, received_from = %from, "Discarding datagram from unexpected source");
                continue;
            }

            let datagram = &buf[..len];
            match ResponseParser::peek_header(datagram) {
                Some((reply_id, flags)) if reply_id == id && flags.response => {}
                Some((reply_id, flags)) => {
                    debug!(server = %server, expected_id = id, reply_id, qr = flags.response, "Discarding unrelated datagram");
                    continue;
                }
                None => {
                    debug!(server = %server, len, "Discarding runt datagram");
                    continue;
                }
            }

            return match ResponseParser::parse(datagram) {
                Ok(message) => Ok(Received::Message(message)),
                Err(e) => {
                    warn!(server = %server, id, error = %e, "Malformed response");
                    Ok(Received::Malformed)
                }
            };
        }
    }

    /// Re-ask over the stream transport. A reply that does not decode or
    /// carries another ID gives up on this server (`Ok(None)`); only
    /// transport errors are returned as `Err`.
    async fn query_over_tcp(
        &self,
        question: &Question,
        server: SocketAddr,
        id: u16,
        query_bytes: &[u8],
    ) -> Result<Option<DnsMessage>, DomainError> {
        self.observer
            .query_sent(self.stream.protocol_name(), question, server, id);

        let response = self.stream.send(server, query_bytes, self.timeout).await?;
        let message = match ResponseParser::parse(&response.bytes) {
            Ok(message) => message,
            Err(e) => {
                warn!(server = %server, id, protocol = response.protocol_used, error = %e, "Malformed response");
                return Ok(None);
            }
        };

        if message.id != id {
            warn!(
                server = %server,
                protocol = response.protocol_used,
                expected_id = id,
                reply_id = message.id,
                "Response ID mismatch"
            );
            return Ok(None);
        }

        Ok(Some(message))
    }
}

#[async_trait]
impl NameserverClient for UdpNameserverClient {
    async fn query(
        &self,
        question: &Question,
        server: IpAddr,
    ) -> Result<QueryOutcome, DomainError> {
        let server = SocketAddr::new(server, self.port);
        let (id, query_bytes) = MessageBuilder::build_query(question)?;
        let mut buf = vec![0u8; self.buffer_size.max(HEADER_LEN)];

        let _exchange = self.exchange_lock.lock().await;

        for attempt in 1..=self.max_attempts {
            self.observer
                .query_sent(self.socket.protocol_name(), question, server, id);
            self.socket.send_to(&query_bytes, server).await?;

            let deadline = Instant::now() + self.timeout;
            let response = match self.receive_matching(server, id, deadline, &mut buf).await? {
                Received::Message(message) => message,
                Received::TimedOut => {
                    debug!(server = %server, id, attempt, "Timed out waiting for response");
                    continue;
                }
                Received::Malformed => continue,
            };

            if response.flags.truncated && self.tcp_fallback {
                // The caller only sees the TCP reply, so the truncated
                // header is reported here.
                self.observer.response_received(
                    response.id,
                    response.flags.authoritative,
                    response.flags.truncated,
                    response.response_code(),
                );
                debug!(server = %server, id, "Response truncated (TC bit), retrying via TCP");

                let outcome = match self.query_over_tcp(question, server, id, &query_bytes).await? {
                    Some(message) => QueryOutcome::Response(message),
                    None => QueryOutcome::NoResponse,
                };
                return Ok(outcome);
            }

            return Ok(QueryOutcome::Response(response));
        }

        debug!(
            server = %server,
            id,
            attempts = self.max_attempts,
            "No response after all attempts"
        );
        Ok(QueryOutcome::NoResponse)
    }
}
