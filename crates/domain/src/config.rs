pub mod errors;
pub mod logging;
pub mod resolver;
pub mod root;

pub use errors::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use resolver::{ResolverConfig, RootHint, MAX_DNS_MESSAGE_LENGTH, MAX_EDNS_MESSAGE_LENGTH};
pub use root::{CliOverrides, Config};
