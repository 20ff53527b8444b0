use super::IterativeQueryUseCase;
use ferrous_lookup_domain::{DomainError, Question, RecordType, ResourceRecord};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Resolves a question and transparently follows CNAME chains, returning the
/// aliases together with the records they lead to.
pub struct FollowCnamesUseCase {
    resolver: Arc<IterativeQueryUseCase>,
}

impl FollowCnamesUseCase {
    pub fn new(resolver: Arc<IterativeQueryUseCase>) -> Self {
        Self { resolver }
    }

    /// Each hop spends one unit of `max_indirection`; a lookup started with
    /// a negative budget fails with `IndirectionLimitExceeded`.
    pub async fn execute(
        &self,
        question: &Question,
        max_indirection: i32,
    ) -> Result<HashSet<ResourceRecord>, DomainError> {
        let mut results = HashSet::new();
        let mut pending = vec![(question.clone(), max_indirection)];

        while let Some((current, budget)) = pending.pop() {
            if budget < 0 {
                return Err(DomainError::IndirectionLimitExceeded {
                    limit: max_indirection,
                });
            }

            let direct = self.resolver.execute(&current).await?;

            if direct.iter().any(|record| record.answers(&current)) {
                results.extend(direct);
                continue;
            }

            for record in direct {
                if record.record_type() == RecordType::CNAME {
                    if let Some(target) = record.target_name() {
                        debug!(
                            alias = %current.name,
                            cname_target = target,
                            remaining = budget - 1,
                            "Following CNAME"
                        );
                        pending.push((current.with_name(target), budget - 1));
                    }
                }
                results.insert(record);
            }
        }

        Ok(results)
    }
}
