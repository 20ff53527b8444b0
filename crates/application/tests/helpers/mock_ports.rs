#![allow(dead_code)]

use async_trait::async_trait;
use ferrous_lookup_application::ports::{
    NameserverClient, QueryObserver, QueryOutcome, RecordCachePort,
};
use ferrous_lookup_domain::{
    DnsMessage, DomainError, MessageFlags, Question, RecordType, ResourceRecord, ResponseCode,
    Section,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct MockRecordCache {
    records: Mutex<HashMap<Question, HashSet<ResourceRecord>>>,
    lookups: AtomicUsize,
}

impl MockRecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = ResourceRecord>) -> Self {
        let cache = Self::new();
        for record in records {
            cache.add_result(record);
        }
        cache
    }

    pub fn total_records(&self) -> usize {
        self.records.lock().unwrap().values().map(HashSet::len).sum()
    }

    /// Number of `get_cached_results` calls so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl RecordCachePort for MockRecordCache {
    fn get_cached_results(&self, question: &Question) -> HashSet<ResourceRecord> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.records
            .lock()
            .unwrap()
            .get(question)
            .map(|set| set.iter().filter(|r| !r.is_expired()).cloned().collect())
            .unwrap_or_default()
    }

    fn add_result(&self, record: ResourceRecord) {
        self.records
            .lock()
            .unwrap()
            .entry(record.question.clone())
            .or_default()
            .replace(record);
    }
}

/// Scripted nameservers keyed by address. Unscripted servers never answer.
#[derive(Default)]
pub struct MockNameserverClient {
    scripts: Mutex<HashMap<IpAddr, VecDeque<Result<QueryOutcome, DomainError>>>>,
    calls: Mutex<Vec<(Question, IpAddr)>>,
}

impl MockNameserverClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, server: &str, message: DnsMessage) {
        self.push(server, Ok(QueryOutcome::Response(message)));
    }

    pub fn fail(&self, server: &str, error: DomainError) {
        self.push(server, Err(error));
    }

    fn push(&self, server: &str, outcome: Result<QueryOutcome, DomainError>) {
        let ip: IpAddr = server.parse().unwrap();
        self.scripts
            .lock()
            .unwrap()
            .entry(ip)
            .or_default()
            .push_back(outcome);
    }

    pub fn calls(&self) -> Vec<(Question, IpAddr)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn servers_called(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|(_, ip)| ip.to_string())
            .collect()
    }
}

#[async_trait]
impl NameserverClient for MockNameserverClient {
    async fn query(
        &self,
        question: &Question,
        server: IpAddr,
    ) -> Result<QueryOutcome, DomainError> {
        self.calls.lock().unwrap().push((question.clone(), server));
        self.scripts
            .lock()
            .unwrap()
            .get_mut(&server)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Ok(QueryOutcome::NoResponse))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    Sent(u16),
    Header { id: u16, authoritative: bool, rcode: ResponseCode },
    Section(Section, usize),
    Record(Section, RecordType),
}

#[derive(Default)]
pub struct RecordingObserver {
    pub events: Mutex<Vec<TraceEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl QueryObserver for RecordingObserver {
    fn query_sent(&self, _transport: &'static str, _question: &Question, _server: SocketAddr, id: u16) {
        self.events.lock().unwrap().push(TraceEvent::Sent(id));
    }

    fn response_received(&self, id: u16, authoritative: bool, _truncated: bool, rcode: ResponseCode) {
        self.events.lock().unwrap().push(TraceEvent::Header {
            id,
            authoritative,
            rcode,
        });
    }

    fn section_started(&self, section: Section, count: usize) {
        self.events
            .lock()
            .unwrap()
            .push(TraceEvent::Section(section, count));
    }

    fn record_decoded(&self, section: Section, record: &ResourceRecord) {
        self.events
            .lock()
            .unwrap()
            .push(TraceEvent::Record(section, record.record_type()));
    }
}

/// A NOERROR response carrying the given sections.
pub fn response_with(
    question: &Question,
    answers: Vec<ResourceRecord>,
    authorities: Vec<ResourceRecord>,
    additionals: Vec<ResourceRecord>,
) -> DnsMessage {
    DnsMessage {
        id: 0x1234,
        flags: MessageFlags {
            response: true,
            authoritative: !answers.is_empty(),
            ..Default::default()
        },
        question: Some(question.clone()),
        answers,
        authorities,
        additionals,
    }
}

/// A referral from `zone` to one nameserver with glue.
pub fn referral(question: &Question, zone: &str, ns_name: &str, ns_ip: &str) -> DnsMessage {
    response_with(
        question,
        vec![],
        vec![ResourceRecord::name_target(zone, RecordType::NS, 3600, ns_name)],
        vec![ResourceRecord::address(ns_name, 3600, ns_ip.parse().unwrap())],
    )
}
