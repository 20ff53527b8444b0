//! DNS Message Builder
//!
//! Serializes messages to wire format. Names are never compressed on the
//! way out; only the decoder deals with pointers.

use super::name::encode_name;
use super::{hex_decode, HEADER_LEN};
use ferrous_lookup_domain::{DnsMessage, DomainError, Question, RecordData, RecordType, ResourceRecord};
use std::net::IpAddr;

pub struct MessageBuilder;

impl MessageBuilder {
    /// Build a standard query (QR=0, OPCODE=0, RD=0) with a random ID.
    ///
    /// Returns the ID alongside the bytes so the caller can match replies.
    pub fn build_query(question: &Question) -> Result<(u16, Vec<u8>), DomainError> {
        let id = fastrand::u16(..);
        Ok((id, Self::build_query_with_id(question, id)?))
    }

    pub fn build_query_with_id(question: &Question, id: u16) -> Result<Vec<u8>, DomainError> {
        Self::encode(&DnsMessage::query(question.clone(), id))
    }

    /// Serialize any message. The output length is exactly the message
    /// length; it is sent on the socket as is.
    pub fn encode(message: &DnsMessage) -> Result<Vec<u8>, DomainError> {
        let mut buf = Vec::with_capacity(HEADER_LEN + 64);

        buf.extend_from_slice(&message.id.to_be_bytes());
        buf.extend_from_slice(&message.flags.to_u16().to_be_bytes());
        buf.extend_from_slice(&u16::from(message.question.is_some()).to_be_bytes());
        for section in [&message.answers, &message.authorities, &message.additionals] {
            let count = u16::try_from(section.len())
                .map_err(|_| DomainError::malformed("Too many records in section"))?;
            buf.extend_from_slice(&count.to_be_bytes());
        }

        if let Some(question) = &message.question {
            encode_name(&question.name, &mut buf)?;
            buf.extend_from_slice(&question.record_type.to_u16().to_be_bytes());
            buf.extend_from_slice(&question.record_class.to_u16().to_be_bytes());
        }

        for record in message.records() {
            encode_record(record, &mut buf)?;
        }

        Ok(buf)
    }
}

fn encode_record(record: &ResourceRecord, buf: &mut Vec<u8>) -> Result<(), DomainError> {
    encode_name(record.name(), buf)?;
    buf.extend_from_slice(&record.record_type().to_u16().to_be_bytes());
    buf.extend_from_slice(&record.question.record_class.to_u16().to_be_bytes());
    buf.extend_from_slice(&record.ttl.to_be_bytes());

    let length_at = buf.len();
    buf.extend_from_slice(&[0, 0]);

    match &record.data {
        RecordData::Address(IpAddr::V4(ip)) => buf.extend_from_slice(&ip.octets()),
        RecordData::Address(IpAddr::V6(ip)) => buf.extend_from_slice(&ip.octets()),
        RecordData::Name(target) => {
            if record.record_type() == RecordType::MX {
                buf.extend_from_slice(&0u16.to_be_bytes());
            }
            encode_name(target, buf)?;
        }
        RecordData::Opaque(hex) => {
            let bytes = hex_decode(hex).ok_or_else(|| {
                DomainError::malformed(format!("Opaque RDATA of {} is not hex", record.name()))
            })?;
            buf.extend_from_slice(&bytes);
        }
    }

    let rdlength = u16::try_from(buf.len() - length_at - 2)
        .map_err(|_| DomainError::malformed(format!("RDATA of {} too long", record.name())))?;
    buf[length_at..length_at + 2].copy_from_slice(&rdlength.to_be_bytes());
    Ok(())
}
