use super::DnsCache;
use ferrous_lookup_application::ports::RecordCachePort;
use ferrous_lookup_domain::{Question, RecordData, RecordType, ResourceRecord, RootHint};
use std::sync::Arc;
use tracing::info;

impl DnsCache {
    /// A cache that already knows the root nameservers.
    pub fn with_root_hints(hints: &[RootHint]) -> Self {
        let cache = Self::new();
        cache.seed_root_hints(hints);
        cache
    }

    /// Insert permanent NS records for the root zone plus their glue.
    /// Resolution always has somewhere to start, however stale the rest of
    /// the cache gets.
    pub fn seed_root_hints(&self, hints: &[RootHint]) {
        for hint in hints {
            let name = hint.name.trim_end_matches('.');
            self.add_result(ResourceRecord::permanent(
                Question::root(RecordType::NS),
                RecordData::Name(Arc::from(name)),
            ));

            let glue_type = if hint.address.is_ipv4() {
                RecordType::A
            } else {
                RecordType::AAAA
            };
            self.add_result(ResourceRecord::permanent(
                Question::new(name, glue_type),
                RecordData::Address(hint.address),
            ));
        }

        info!(root_servers = hints.len(), "Root hints loaded into cache");
    }
}
