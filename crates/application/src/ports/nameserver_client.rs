use async_trait::async_trait;
use ferrous_lookup_domain::{DnsMessage, DomainError, Question};
use std::net::IpAddr;

/// Result of a single exchange with one nameserver.
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    /// A matching response, already decoded. Its RCODE is not checked here.
    Response(DnsMessage),
    /// Every attempt timed out; the caller moves on to the next server.
    NoResponse,
}

#[async_trait]
pub trait NameserverClient: Send + Sync {
    /// Send `question` to `server` and wait for the matching reply.
    ///
    /// Errors are reserved for transport failures; silence is `NoResponse`.
    async fn query(&self, question: &Question, server: IpAddr)
        -> Result<QueryOutcome, DomainError>;
}
