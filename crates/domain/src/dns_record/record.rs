use super::RecordType;
use crate::Question;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Typed RDATA. The variant always matches the record's type: addresses for
/// A/AAAA, a target name for NS/CNAME/MX, hex for everything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordData {
    Address(IpAddr),
    Name(Arc<str>),
    Opaque(String),
}

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordData::Address(ip) => write!(f, "{}", ip),
            RecordData::Name(name) => write!(f, "{}.", name),
            RecordData::Opaque(hex) => write!(f, "0x{}", hex),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResourceRecord {
    /// Owner name, type and class of this record.
    pub question: Question,
    pub ttl: u32,
    pub data: RecordData,
    /// `None` marks a permanent record (root hints).
    pub expires_at: Option<Instant>,
}

impl ResourceRecord {
    pub fn new(question: Question, ttl: u32, data: RecordData) -> Self {
        Self::expiring_at(
            question,
            ttl,
            data,
            Instant::now() + Duration::from_secs(u64::from(ttl)),
        )
    }

    pub fn expiring_at(question: Question, ttl: u32, data: RecordData, expires_at: Instant) -> Self {
        Self {
            question,
            ttl,
            data,
            expires_at: Some(expires_at),
        }
    }

    pub fn permanent(question: Question, data: RecordData) -> Self {
        Self {
            question,
            ttl: u32::MAX,
            data,
            expires_at: None,
        }
    }

    /// A or AAAA record, typed from the address family.
    pub fn address(name: impl AsRef<str>, ttl: u32, ip: IpAddr) -> Self {
        let record_type = if ip.is_ipv4() {
            RecordType::A
        } else {
            RecordType::AAAA
        };
        Self::new(Question::new(name, record_type), ttl, RecordData::Address(ip))
    }

    /// NS, CNAME or MX record pointing at `target`.
    pub fn name_target(
        name: impl AsRef<str>,
        record_type: RecordType,
        ttl: u32,
        target: impl AsRef<str>,
    ) -> Self {
        let target = target.as_ref();
        let target = target.strip_suffix('.').unwrap_or(target);
        Self::new(
            Question::new(name, record_type),
            ttl,
            RecordData::Name(Arc::from(target)),
        )
    }

    pub fn record_type(&self) -> RecordType {
        self.question.record_type
    }

    pub fn name(&self) -> &str {
        &self.question.name
    }

    pub fn is_permanent(&self) -> bool {
        self.expires_at.is_none()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires_at) => now >= expires_at,
            None => false,
        }
    }

    pub fn remaining_ttl(&self) -> u32 {
        match self.expires_at {
            Some(expires_at) => expires_at
                .saturating_duration_since(Instant::now())
                .as_secs()
                .min(u64::from(u32::MAX)) as u32,
            None => self.ttl,
        }
    }

    pub fn ip_address(&self) -> Option<IpAddr> {
        match &self.data {
            RecordData::Address(ip) => Some(*ip),
            _ => None,
        }
    }

    pub fn target_name(&self) -> Option<&str> {
        match &self.data {
            RecordData::Name(name) => Some(name),
            _ => None,
        }
    }

    /// True when this record answers `question` directly (same key).
    pub fn answers(&self, question: &Question) -> bool {
        self.question == *question
    }
}

// Identity is the owner key plus payload; TTL and expiry are freshness
// metadata, so a re-learned record replaces the older copy.
impl PartialEq for ResourceRecord {
    fn eq(&self, other: &Self) -> bool {
        self.question == other.question && self.data == other.data
    }
}

impl Eq for ResourceRecord {}

impl Hash for ResourceRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.question.hash(state);
        self.data.hash(state);
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<30} {:<8} {:<6} {}",
            format!("{}.", self.question.name),
            self.remaining_ttl(),
            self.record_type(),
            self.data
        )
    }
}
