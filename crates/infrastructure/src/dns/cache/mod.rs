mod metrics;
mod root_hints;
mod storage;

pub use metrics::CacheMetrics;
pub use storage::DnsCache;
