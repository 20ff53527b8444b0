use ferrous_lookup_domain::{Question, ResourceRecord, ResponseCode, Section};
use std::net::SocketAddr;

/// Trace hooks fired while a lookup runs. Notifications only: nothing an
/// observer does can change the outcome of a query.
pub trait QueryObserver: Send + Sync {
    fn query_sent(&self, _transport: &'static str, _question: &Question, _server: SocketAddr, _id: u16) {}

    fn response_received(&self, _id: u16, _authoritative: bool, _truncated: bool, _rcode: ResponseCode) {}

    fn section_started(&self, _section: Section, _count: usize) {}

    fn record_decoded(&self, _section: Section, _record: &ResourceRecord) {}
}

pub struct NoopQueryObserver;

impl QueryObserver for NoopQueryObserver {}
