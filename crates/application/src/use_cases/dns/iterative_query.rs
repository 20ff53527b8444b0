use crate::ports::{NameserverClient, NoopQueryObserver, QueryObserver, QueryOutcome, RecordCachePort};
use ferrous_lookup_domain::{
    DnsMessage, DomainError, Question, RecordType, ResourceRecord, Section,
};
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, warn};

const DEFAULT_NAMESERVER_INDIRECTION: u32 = 10;

/// Iterative resolution: start at the closest cached delegation and follow
/// referrals until a server answers, every candidate has been tried, or a
/// server reports an error.
pub struct IterativeQueryUseCase {
    cache: Arc<dyn RecordCachePort>,
    client: Arc<dyn NameserverClient>,
    observer: Arc<dyn QueryObserver>,
    max_nameserver_indirection: u32,
    use_ipv6_nameservers: bool,
}

impl IterativeQueryUseCase {
    pub fn new(cache: Arc<dyn RecordCachePort>, client: Arc<dyn NameserverClient>) -> Self {
        Self {
            cache,
            client,
            observer: Arc::new(NoopQueryObserver),
            max_nameserver_indirection: DEFAULT_NAMESERVER_INDIRECTION,
            use_ipv6_nameservers: false,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn QueryObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// How many nested lookups may be spent finding addresses for
    /// nameservers that were delegated to without glue. Zero disables it.
    pub fn with_nameserver_indirection(mut self, budget: u32) -> Self {
        self.max_nameserver_indirection = budget;
        self
    }

    pub fn with_ipv6_nameservers(mut self, enabled: bool) -> Self {
        self.use_ipv6_nameservers = enabled;
        self
    }

    /// Records answering `question`: direct matches plus any CNAME owned by
    /// the name. Returns whatever is known, possibly nothing, once the
    /// candidate nameservers are exhausted.
    pub async fn execute(&self, question: &Question) -> Result<HashSet<ResourceRecord>, DomainError> {
        let mut attempted = HashSet::from([question.clone()]);
        self.resolve(question.clone(), self.max_nameserver_indirection, &mut attempted)
            .await
    }

    /// `attempted` holds every question already being resolved or given
    /// up on during this lookup, so each nameserver name is chased once.
    fn resolve<'a>(
        &'a self,
        question: Question,
        nameserver_budget: u32,
        attempted: &'a mut HashSet<Question>,
    ) -> BoxFuture<'a, Result<HashSet<ResourceRecord>, DomainError>> {
        async move {
            let mut answers = self.cached_answers(&question);
            if resolves(&answers, &question) {
                debug!(question = %question, records = answers.len(), "Answered from cache");
                return Ok(answers);
            }

            let mut tried: HashSet<ResourceRecord> = HashSet::new();

            loop {
                let candidates = self
                    .candidate_servers(&question, nameserver_budget, attempted)
                    .await;
                if candidates.iter().all(|server| tried.contains(server)) {
                    debug!(
                        question = %question,
                        tried = tried.len(),
                        "No untried nameservers left"
                    );
                    answers.extend(self.cached_answers(&question));
                    return Ok(answers);
                }

                for server in candidates {
                    if !tried.insert(server.clone()) {
                        continue;
                    }
                    let Some(address) = server.ip_address() else {
                        continue;
                    };

                    debug!(
                        question = %question,
                        nameserver = server.name(),
                        address = %address,
                        "Querying nameserver"
                    );

                    if let Some(records) = self.individual_query_process(&question, address).await? {
                        answers.extend(
                            records
                                .into_iter()
                                .filter(|record| is_answer_record(record, &question)),
                        );
                        answers.extend(self.cached_answers(&question));
                        if resolves(&answers, &question) {
                            return Ok(answers);
                        }
                    }
                }
            }
        }
        .boxed()
    }

    /// One exchange with one server, followed by response processing.
    ///
    /// `Ok(None)` means the server never answered. A non-zero RCODE is an
    /// error; otherwise every record of the response is cached and returned.
    pub async fn individual_query_process(
        &self,
        question: &Question,
        server: IpAddr,
    ) -> Result<Option<Vec<ResourceRecord>>, DomainError> {
        match self.client.query(question, server).await? {
            QueryOutcome::NoResponse => {
                debug!(question = %question, server = %server, "Nameserver did not respond");
                Ok(None)
            }
            QueryOutcome::Response(message) => self.process_response(&message, server).map(Some),
        }
    }

    fn process_response(
        &self,
        message: &DnsMessage,
        server: IpAddr,
    ) -> Result<Vec<ResourceRecord>, DomainError> {
        let rcode = message.response_code();
        self.observer.response_received(
            message.id,
            message.flags.authoritative,
            message.flags.truncated,
            rcode,
        );

        if rcode.is_error() {
            warn!(server = %server, rcode = %rcode, "Nameserver returned an error");
            return Err(DomainError::NonZeroRcode {
                rcode,
                server: server.to_string(),
            });
        }

        let mut records = Vec::with_capacity(
            message.answers.len() + message.authorities.len() + message.additionals.len(),
        );

        for section in [Section::Answer, Section::Authority, Section::Additional] {
            let section_records = message.section(section);
            self.observer.section_started(section, section_records.len());

            for record in section_records {
                self.observer.record_decoded(section, record);
                if record.record_type() == RecordType::OPT {
                    continue;
                }
                self.cache.add_result(record.clone());
                records.push(record.clone());
            }
        }

        debug!(
            server = %server,
            answers = message.answers.len(),
            authorities = message.authorities.len(),
            additionals = message.additionals.len(),
            "Response cached"
        );

        Ok(records)
    }

    /// Nameservers with a known address for the closest cached zone.
    ///
    /// When the delegation came without glue, the nameserver names are
    /// resolved through this same engine, spending one unit of budget per
    /// nesting level.
    async fn candidate_servers(
        &self,
        question: &Question,
        nameserver_budget: u32,
        attempted: &mut HashSet<Question>,
    ) -> Vec<ResourceRecord> {
        let nameservers = self.cache.best_nameservers(question);
        let usable = self
            .cache
            .filter_by_known_address(&nameservers, self.use_ipv6_nameservers);

        if !usable.is_empty() || nameserver_budget == 0 {
            return usable;
        }

        for ns in &nameservers {
            let Some(target) = ns.target_name() else {
                continue;
            };
            // A server inside its own zone is only reachable through glue.
            if is_within_zone(target, ns.name()) {
                debug!(nameserver = target, zone = ns.name(), "Skipping in-zone nameserver without glue");
                continue;
            }
            let ns_question = Question::with_class(target, RecordType::A, question.record_class);
            if !attempted.insert(ns_question.clone()) {
                debug!(nameserver = target, "Nameserver address already looked up");
                continue;
            }

            debug!(nameserver = target, zone = ns.name(), "Resolving nameserver without glue");
            if let Err(e) = self
                .resolve(ns_question, nameserver_budget - 1, &mut *attempted)
                .await
            {
                debug!(nameserver = target, error = %e, "Nameserver address lookup failed");
                continue;
            }

            let usable = self
                .cache
                .filter_by_known_address(&nameservers, self.use_ipv6_nameservers);
            if !usable.is_empty() {
                return usable;
            }
        }

        Vec::new()
    }

    fn cached_answers(&self, question: &Question) -> HashSet<ResourceRecord> {
        let mut answers = self.cache.get_cached_results(question);
        if question.record_type != RecordType::CNAME {
            answers.extend(
                self.cache
                    .get_cached_results(&question.with_type(RecordType::CNAME)),
            );
        }
        answers
    }
}

/// A record belongs in the answer set when it is owned by the question name
/// and is either of the requested type or a CNAME.
fn is_answer_record(record: &ResourceRecord, question: &Question) -> bool {
    record.answers(question) || record.answers(&question.with_type(RecordType::CNAME))
}

/// A CNAME at the name is authoritative for every type, so it ends the walk
/// just like a direct answer does.
fn resolves(answers: &HashSet<ResourceRecord>, question: &Question) -> bool {
    answers.iter().any(|record| is_answer_record(record, question))
}

fn is_within_zone(name: &str, zone: &str) -> bool {
    if zone.is_empty() {
        return true;
    }
    let name = name.to_ascii_lowercase();
    let zone = zone.to_ascii_lowercase();
    name == zone || name.ends_with(&format!(".{}", zone))
}
