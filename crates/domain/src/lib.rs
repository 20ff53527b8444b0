//! Ferrous Lookup Domain Layer
pub mod config;
pub mod dns_message;
pub mod dns_record;
pub mod errors;
pub mod question;

pub use config::{
    CliOverrides, Config, ConfigError, LogFormat, LoggingConfig, ResolverConfig, RootHint,
};
pub use dns_message::{DnsMessage, MessageFlags, ResponseCode, Section};
pub use dns_record::{RecordClass, RecordData, RecordType, ResourceRecord};
pub use errors::DomainError;
pub use question::Question;
