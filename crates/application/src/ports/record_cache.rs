use ferrous_lookup_domain::{Question, RecordType, ResourceRecord};
use std::collections::HashSet;

/// Time-aware record store shared by every lookup of a resolver instance.
///
/// Implementations provide storage (`get_cached_results`, `add_result`);
/// nameserver selection is derived from those two and rarely needs
/// overriding.
pub trait RecordCachePort: Send + Sync {
    /// Non-expired records whose owner key equals `question`.
    fn get_cached_results(&self, question: &Question) -> HashSet<ResourceRecord>;

    fn add_result(&self, record: ResourceRecord);

    /// NS records of the closest enclosing zone present in the cache.
    ///
    /// Walks from the question name toward the root and returns the first
    /// zone with cached delegation data, so `example.com` wins over `com`,
    /// which wins over the root. Sorted by target for a stable query order.
    fn best_nameservers(&self, question: &Question) -> Vec<ResourceRecord> {
        for zone in question.parent_zones() {
            let zone_question =
                Question::with_class(zone, RecordType::NS, question.record_class);
            let nameservers = self.get_cached_results(&zone_question);
            if !nameservers.is_empty() {
                let mut nameservers: Vec<_> = nameservers.into_iter().collect();
                nameservers.sort_by(|a, b| a.target_name().cmp(&b.target_name()));
                return nameservers;
            }
        }
        Vec::new()
    }

    /// Address records for the nameservers whose target already resolves.
    ///
    /// NS records without cached glue are dropped. AAAA glue is only used
    /// when `include_ipv6` is set.
    fn filter_by_known_address(
        &self,
        nameservers: &[ResourceRecord],
        include_ipv6: bool,
    ) -> Vec<ResourceRecord> {
        let mut seen = HashSet::new();
        let mut addresses = Vec::new();

        for ns in nameservers {
            let Some(target) = ns.target_name() else {
                continue;
            };

            let mut types = vec![RecordType::A];
            if include_ipv6 {
                types.push(RecordType::AAAA);
            }

            for record_type in types {
                let glue_question = Question::with_class(target, record_type, ns.question.record_class);
                let mut glue: Vec<_> = self.get_cached_results(&glue_question).into_iter().collect();
                glue.sort_by_key(|record| record.ip_address());
                for record in glue {
                    if seen.insert(record.clone()) {
                        addresses.push(record);
                    }
                }
            }
        }

        addresses
    }
}
