use super::CacheMetrics;
use dashmap::DashMap;
use ferrous_lookup_application::ports::RecordCachePort;
use ferrous_lookup_domain::{Question, ResourceRecord};
use rustc_hash::{FxBuildHasher, FxHashSet};
use std::collections::HashSet;
use std::sync::atomic::Ordering as AtomicOrdering;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Question-keyed record store shared by all lookups of a resolver.
///
/// Each question's record set sits behind its own DashMap shard lock, so
/// inserts are read-modify-write under that lock and reads return a
/// snapshot. Expired records stay in place until read-time filtering hides
/// them or `evict_expired` sweeps them.
pub struct DnsCache {
    records: DashMap<Question, FxHashSet<ResourceRecord>, FxBuildHasher>,
    metrics: Arc<CacheMetrics>,
}

impl DnsCache {
    pub fn new() -> Self {
        Self {
            records: DashMap::with_hasher(FxBuildHasher),
            metrics: Arc::new(CacheMetrics::default()),
        }
    }

    /// Number of distinct questions with at least one stored record.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.records.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn metrics(&self) -> Arc<CacheMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Drop every expired record, and questions left without records.
    /// Returns how many records were removed.
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        self.records.retain(|_, set| {
            let before = set.len();
            set.retain(|record| !record.is_expired_at(now));
            removed += before - set.len();
            !set.is_empty()
        });

        if removed > 0 {
            self.metrics
                .evictions
                .fetch_add(removed as u64, AtomicOrdering::Relaxed);
            debug!(removed, remaining = self.records.len(), "Expired records evicted");
        }

        removed
    }
}

impl Default for DnsCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordCachePort for DnsCache {
    fn get_cached_results(&self, question: &Question) -> HashSet<ResourceRecord> {
        let now = Instant::now();
        let results: HashSet<ResourceRecord> = self
            .records
            .get(question)
            .map(|set| {
                set.iter()
                    .filter(|record| !record.is_expired_at(now))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        self.metrics.record_lookup(!results.is_empty());
        results
    }

    fn add_result(&self, record: ResourceRecord) {
        let mut set = self.records.entry(record.question.clone()).or_default();
        // A re-learned record carries the newer expiry.
        set.replace(record);
        self.metrics
            .insertions
            .fetch_add(1, AtomicOrdering::Relaxed);
    }
}
