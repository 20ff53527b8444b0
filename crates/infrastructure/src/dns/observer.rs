use ferrous_lookup_application::ports::QueryObserver;
use ferrous_lookup_domain::{Question, ResourceRecord, ResponseCode, Section};
use std::net::SocketAddr;
use tracing::{debug, trace};

/// Emits the query trace as `tracing` events: exchanges at debug, individual
/// records at trace.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingQueryObserver;

impl QueryObserver for TracingQueryObserver {
    fn query_sent(&self, transport: &'static str, question: &Question, server: SocketAddr, id: u16) {
        debug!(
            transport,
            question = %question,
            server = %server,
            id,
            "Query sent"
        );
    }

    fn response_received(&self, id: u16, authoritative: bool, truncated: bool, rcode: ResponseCode) {
        debug!(id, authoritative, truncated, rcode = %rcode, "Response received");
    }

    fn section_started(&self, section: Section, count: usize) {
        trace!(section = section.as_str(), count, "Section");
    }

    fn record_decoded(&self, section: Section, record: &ResourceRecord) {
        trace!(section = section.as_str(), record = %record, "Record");
    }
}
