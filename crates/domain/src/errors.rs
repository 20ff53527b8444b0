use crate::ResponseCode;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Malformed DNS message: {0}")]
    MalformedMessage(String),

    #[error("Server {server} answered with {rcode}")]
    NonZeroRcode { rcode: ResponseCode, server: String },

    #[error("CNAME indirection limit of {limit} exceeded")]
    IndirectionLimitExceeded { limit: i32 },

    #[error("Transport failure talking to {server}: {reason}")]
    TransportFailure { server: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DomainError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        DomainError::MalformedMessage(reason.into())
    }

    pub fn transport(server: impl ToString, reason: impl ToString) -> Self {
        DomainError::TransportFailure {
            server: server.to_string(),
            reason: reason.to_string(),
        }
    }
}
