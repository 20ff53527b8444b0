#![allow(dead_code)]
use ferrous_lookup_domain::{Question, RecordData, RecordType, ResourceRecord};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;

pub struct RecordBuilder {
    name: String,
    record_type: RecordType,
    ttl: u32,
    data: RecordData,
    expires_at: Option<Instant>,
    permanent: bool,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self {
            name: "example.com".to_string(),
            record_type: RecordType::A,
            ttl: 300,
            data: RecordData::Address("192.0.2.1".parse().unwrap()),
            expires_at: None,
            permanent: false,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn address(mut self, ip: &str) -> Self {
        let ip: IpAddr = ip.parse().unwrap();
        self.record_type = if ip.is_ipv4() {
            RecordType::A
        } else {
            RecordType::AAAA
        };
        self.data = RecordData::Address(ip);
        self
    }

    pub fn pointing_to(mut self, record_type: RecordType, target: &str) -> Self {
        self.record_type = record_type;
        self.data = RecordData::Name(Arc::from(target));
        self
    }

    pub fn opaque(mut self, record_type: RecordType, hex: &str) -> Self {
        self.record_type = record_type;
        self.data = RecordData::Opaque(hex.to_string());
        self
    }

    pub fn expires_at(mut self, at: Instant) -> Self {
        self.expires_at = Some(at);
        self
    }

    pub fn permanent(mut self) -> Self {
        self.permanent = true;
        self
    }

    pub fn build(self) -> ResourceRecord {
        let question = Question::new(&self.name, self.record_type);
        if self.permanent {
            return ResourceRecord::permanent(question, self.data);
        }
        match self.expires_at {
            Some(at) => ResourceRecord::expiring_at(question, self.ttl, self.data, at),
            None => ResourceRecord::new(question, self.ttl, self.data),
        }
    }
}
