#![allow(dead_code)]

pub mod dns_server_mock;
pub mod scripted_transport;

pub use dns_server_mock::{MockDnsServer, Transport};
pub use scripted_transport::{
    answer_with, echo_query, malformed_with_matching_id, respond_from, truncated, wrong_id,
    ClientEvent, RecordingObserver, ScriptedSocket, ScriptedStream,
};

use ferrous_lookup_domain::{DnsMessage, MessageFlags, ResourceRecord};

/// A NOERROR reply to `query` with the given sections.
pub fn reply_to(
    query: &DnsMessage,
    answers: Vec<ResourceRecord>,
    authorities: Vec<ResourceRecord>,
    additionals: Vec<ResourceRecord>,
) -> DnsMessage {
    DnsMessage {
        id: query.id,
        flags: MessageFlags {
            response: true,
            authoritative: !answers.is_empty(),
            ..Default::default()
        },
        question: query.question.clone(),
        answers,
        authorities,
        additionals,
    }
}
