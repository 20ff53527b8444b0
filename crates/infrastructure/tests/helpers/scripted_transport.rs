#![allow(dead_code)]

use async_trait::async_trait;
use ferrous_lookup_application::ports::QueryObserver;
use ferrous_lookup_domain::{DnsMessage, DomainError, Question, ResourceRecord, ResponseCode};
use ferrous_lookup_infrastructure::dns::{
    DatagramSocket, DnsTransport, MessageBuilder, ResponseParser, TransportResponse,
};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Builds one datagram from the query bytes and the queried server.
pub type Responder = Box<dyn Fn(&[u8], SocketAddr) -> (Vec<u8>, SocketAddr) + Send + Sync>;

/// Datagram socket whose replies are scripted per send. A send with no
/// script left (or an empty round) gets no reply, so the receive pends
/// until the caller's timeout fires.
#[derive(Default)]
pub struct ScriptedSocket {
    rounds: Mutex<VecDeque<Vec<Responder>>>,
    inbox: Mutex<VecDeque<(Vec<u8>, SocketAddr)>>,
    sent: Mutex<Vec<Vec<u8>>>,
    fail_sends: bool,
}

impl ScriptedSocket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    /// Replies delivered after the next unscripted send.
    pub fn then(self, round: Vec<Responder>) -> Self {
        self.rounds.lock().unwrap().push_back(round);
        self
    }

    /// A send that gets no reply.
    pub fn then_silence(self) -> Self {
        self.then(Vec::new())
    }

    pub fn sends(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl DatagramSocket for ScriptedSocket {
    async fn send_to(&self, message_bytes: &[u8], server: SocketAddr) -> Result<(), DomainError> {
        if self.fail_sends {
            return Err(DomainError::transport(server, "network unreachable"));
        }
        self.sent.lock().unwrap().push(message_bytes.to_vec());

        let round = self.rounds.lock().unwrap().pop_front().unwrap_or_default();
        let mut inbox = self.inbox.lock().unwrap();
        for responder in round {
            inbox.push_back(responder(message_bytes, server));
        }
        Ok(())
    }

    async fn recv_from(
        &self,
        _server: SocketAddr,
        buf: &mut [u8],
    ) -> Result<(usize, SocketAddr), DomainError> {
        let next = self.inbox.lock().unwrap().pop_front();
        match next {
            Some((bytes, from)) => {
                let len = bytes.len().min(buf.len());
                buf[..len].copy_from_slice(&bytes[..len]);
                Ok((len, from))
            }
            None => std::future::pending().await,
        }
    }
}

fn parse_query(query: &[u8]) -> DnsMessage {
    ResponseParser::parse(query).expect("client sent an undecodable query")
}

fn encode(message: &DnsMessage) -> Vec<u8> {
    MessageBuilder::encode(message).expect("scripted reply must encode")
}

pub fn answer_with(records: Vec<ResourceRecord>) -> Responder {
    Box::new(move |query, server| {
        let query = parse_query(query);
        (encode(&super::reply_to(&query, records.clone(), vec![], vec![])), server)
    })
}

pub fn truncated() -> Responder {
    Box::new(|query, server| {
        let query = parse_query(query);
        let mut reply = super::reply_to(&query, vec![], vec![], vec![]);
        reply.flags.truncated = true;
        (encode(&reply), server)
    })
}

pub fn wrong_id() -> Responder {
    Box::new(|query, server| {
        let mut reply = super::reply_to(&parse_query(query), vec![], vec![], vec![]);
        reply.id = reply.id.wrapping_add(1);
        (encode(&reply), server)
    })
}

/// The query itself bounced back: right ID, QR clear.
pub fn echo_query() -> Responder {
    Box::new(|query, server| (query.to_vec(), server))
}

pub fn malformed_with_matching_id() -> Responder {
    Box::new(|query, server| {
        let mut bytes = query[..2].to_vec();
        bytes.extend_from_slice(&[0x80, 0x00, 0x00, 0x09, 0x00, 0x09, 0x00, 0x00, 0x00, 0x00]);
        (bytes, server)
    })
}

/// Wrap a responder so its datagram appears to come from `from`.
pub fn respond_from(from: SocketAddr, inner: Responder) -> Responder {
    Box::new(move |query, server| (inner(query, server).0, from))
}

enum StreamReply {
    Answer(Vec<ResourceRecord>),
    Garbage(Vec<u8>),
    WrongId,
}

/// Stream transport with one canned reply for every exchange.
pub struct ScriptedStream {
    reply: StreamReply,
    calls: AtomicUsize,
}

impl ScriptedStream {
    fn with_reply(reply: StreamReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn answering(records: Vec<ResourceRecord>) -> Self {
        Self::with_reply(StreamReply::Answer(records))
    }

    /// Replies with bytes that do not decode.
    pub fn garbage(bytes: Vec<u8>) -> Self {
        Self::with_reply(StreamReply::Garbage(bytes))
    }

    pub fn wrong_id() -> Self {
        Self::with_reply(StreamReply::WrongId)
    }

    pub fn unused() -> Self {
        Self::answering(Vec::new())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsTransport for ScriptedStream {
    async fn send(
        &self,
        _server: SocketAddr,
        message_bytes: &[u8],
        _timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let query = parse_query(message_bytes);
        let bytes = match &self.reply {
            StreamReply::Answer(records) => {
                encode(&super::reply_to(&query, records.clone(), vec![], vec![]))
            }
            StreamReply::Garbage(bytes) => bytes.clone(),
            StreamReply::WrongId => {
                let mut reply = super::reply_to(&query, vec![], vec![], vec![]);
                reply.id = reply.id.wrapping_add(1);
                encode(&reply)
            }
        };
        Ok(TransportResponse {
            bytes: bytes.into(),
            protocol_used: "TCP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TCP"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Sent { transport: &'static str, id: u16 },
    Header { id: u16, truncated: bool },
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ClientEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<ClientEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<(&'static str, u16)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ClientEvent::Sent { transport, id } => Some((transport, id)),
                ClientEvent::Header { .. } => None,
            })
            .collect()
    }
}

impl QueryObserver for RecordingObserver {
    fn query_sent(&self, transport: &'static str, _question: &Question, _server: SocketAddr, id: u16) {
        self.events
            .lock()
            .unwrap()
            .push(ClientEvent::Sent { transport, id });
    }

    fn response_received(&self, id: u16, _authoritative: bool, truncated: bool, _rcode: ResponseCode) {
        self.events
            .lock()
            .unwrap()
            .push(ClientEvent::Header { id, truncated });
    }
}
