//! DNS Response Parser
//!
//! Decodes wire-format messages into [`DnsMessage`]. Counts advertised in
//! the header are trusted only as far as the buffer backs them.

use super::name::decode_name;
use super::{hex_encode, HEADER_LEN};
use ferrous_lookup_domain::{
    DnsMessage, DomainError, MessageFlags, Question, RecordClass, RecordData, RecordType,
    ResourceRecord,
};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

// Smallest possible question (root name + type + class) and record
// (root name + type + class + ttl + rdlength).
const MIN_QUESTION_LEN: usize = 5;
const MIN_RECORD_LEN: usize = 11;

pub struct ResponseParser;

impl ResponseParser {
    pub fn parse(bytes: &[u8]) -> Result<DnsMessage, DomainError> {
        let mut reader = WireReader::new(bytes);
        if bytes.len() < HEADER_LEN {
            return Err(DomainError::malformed(format!(
                "Message of {} bytes is shorter than a header",
                bytes.len()
            )));
        }

        let id = reader.read_u16()?;
        let flags = MessageFlags::from_u16(reader.read_u16()?);
        let qdcount = usize::from(reader.read_u16()?);
        let ancount = usize::from(reader.read_u16()?);
        let nscount = usize::from(reader.read_u16()?);
        let arcount = usize::from(reader.read_u16()?);

        let minimum = HEADER_LEN
            + qdcount * MIN_QUESTION_LEN
            + (ancount + nscount + arcount) * MIN_RECORD_LEN;
        if minimum > bytes.len() {
            return Err(DomainError::malformed(format!(
                "Header counts ({}/{}/{}/{}) overrun {} byte message",
                qdcount,
                ancount,
                nscount,
                arcount,
                bytes.len()
            )));
        }

        let mut question = None;
        for _ in 0..qdcount {
            let parsed = reader.read_question()?;
            question.get_or_insert(parsed);
        }

        Ok(DnsMessage {
            id,
            flags,
            question,
            answers: reader.read_records(ancount)?,
            authorities: reader.read_records(nscount)?,
            additionals: reader.read_records(arcount)?,
        })
    }

    /// ID and flags without decoding the rest, for matching replies cheaply.
    pub fn peek_header(bytes: &[u8]) -> Option<(u16, MessageFlags)> {
        let header = bytes.get(..4)?;
        Some((
            u16::from_be_bytes([header[0], header[1]]),
            MessageFlags::from_u16(u16::from_be_bytes([header[2], header[3]])),
        ))
    }
}

struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DomainError> {
        let end = self.pos + len;
        let slice = self.buf.get(self.pos..end).ok_or_else(|| {
            DomainError::malformed(format!(
                "Need {} bytes at offset {}, message has {}",
                len,
                self.pos,
                self.buf.len()
            ))
        })?;
        self.pos = end;
        Ok(slice)
    }

    fn read_u16(&mut self) -> Result<u16, DomainError> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn read_u32(&mut self) -> Result<u32, DomainError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_name(&mut self) -> Result<String, DomainError> {
        let (name, next) = decode_name(self.buf, self.pos)?;
        self.pos = next;
        Ok(name)
    }

    fn read_question(&mut self) -> Result<Question, DomainError> {
        let name = self.read_name()?;
        let record_type = RecordType::from_u16(self.read_u16()?);
        let record_class = RecordClass::from_u16(self.read_u16()?);
        Ok(Question::with_class(name, record_type, record_class))
    }

    fn read_records(&mut self, count: usize) -> Result<Vec<ResourceRecord>, DomainError> {
        (0..count).map(|_| self.read_record()).collect()
    }

    fn read_record(&mut self) -> Result<ResourceRecord, DomainError> {
        let question = self.read_question()?;
        let ttl = self.read_u32()?;
        let rdlength = usize::from(self.read_u16()?);
        let rdata_start = self.pos;
        let rdata = self.take(rdlength)?;
        let rdata_end = self.pos;

        let data = match question.record_type {
            RecordType::A => {
                let octets: [u8; 4] = rdata
                    .try_into()
                    .map_err(|_| bad_length(&question, rdlength))?;
                RecordData::Address(IpAddr::V4(Ipv4Addr::from(octets)))
            }
            RecordType::AAAA => {
                let octets: [u8; 16] = rdata
                    .try_into()
                    .map_err(|_| bad_length(&question, rdlength))?;
                RecordData::Address(IpAddr::V6(Ipv6Addr::from(octets)))
            }
            RecordType::NS | RecordType::CNAME => {
                RecordData::Name(self.name_in_rdata(rdata_start, rdata_end)?)
            }
            RecordType::MX => {
                if rdlength < 3 {
                    return Err(bad_length(&question, rdlength));
                }
                RecordData::Name(self.name_in_rdata(rdata_start + 2, rdata_end)?)
            }
            _ => RecordData::Opaque(hex_encode(rdata)),
        };

        Ok(ResourceRecord::new(question, ttl, data))
    }

    /// Decode a name embedded in RDATA; it may point elsewhere but must not
    /// spill past the RDATA it sits in.
    fn name_in_rdata(&self, start: usize, rdata_end: usize) -> Result<Arc<str>, DomainError> {
        let (name, next) = decode_name(self.buf, start)?;
        if next > rdata_end {
            return Err(DomainError::malformed(format!(
                "Name at {} overruns its RDATA",
                start
            )));
        }
        Ok(Arc::from(name))
    }
}

fn bad_length(question: &Question, rdlength: usize) -> DomainError {
    DomainError::malformed(format!(
        "{} record for {} has RDATA length {}",
        question.record_type, question.name, rdlength
    ))
}
