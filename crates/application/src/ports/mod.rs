mod nameserver_client;
mod query_observer;
mod record_cache;

pub use nameserver_client::{NameserverClient, QueryOutcome};
pub use query_observer::{NoopQueryObserver, QueryObserver};
pub use record_cache::RecordCachePort;
