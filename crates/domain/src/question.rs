use super::{RecordClass, RecordType};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A (name, type, class) triple. Used both as the payload of an outgoing
/// query and as the key records are cached under.
///
/// Names are stored without the trailing dot; the root is the empty string.
/// Comparison and hashing ignore ASCII case.
#[derive(Debug, Clone)]
pub struct Question {
    pub name: Arc<str>,
    pub record_type: RecordType,
    pub record_class: RecordClass,
}

impl Question {
    pub fn new(name: impl AsRef<str>, record_type: RecordType) -> Self {
        Self::with_class(name, record_type, RecordClass::IN)
    }

    pub fn with_class(
        name: impl AsRef<str>,
        record_type: RecordType,
        record_class: RecordClass,
    ) -> Self {
        Self {
            name: normalize_name(name.as_ref()),
            record_type,
            record_class,
        }
    }

    pub fn root(record_type: RecordType) -> Self {
        Self::new("", record_type)
    }

    /// Same type and class, different name.
    pub fn with_name(&self, name: impl AsRef<str>) -> Self {
        Self::with_class(name, self.record_type, self.record_class)
    }

    /// Same name and class, different type.
    pub fn with_type(&self, record_type: RecordType) -> Self {
        Self {
            name: Arc::clone(&self.name),
            record_type,
            record_class: self.record_class,
        }
    }

    pub fn is_root(&self) -> bool {
        self.name.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.name.split('.').filter(|label| !label.is_empty())
    }

    /// The name itself followed by every ancestor zone, ending with the root.
    ///
    /// `www.example.com` yields `www.example.com`, `example.com`, `com`, `""`.
    pub fn parent_zones(&self) -> Vec<&str> {
        let mut zones = Vec::with_capacity(self.labels().count() + 1);
        let mut rest: &str = &self.name;
        while !rest.is_empty() {
            zones.push(rest);
            rest = match rest.find('.') {
                Some(dot) => &rest[dot + 1..],
                None => "",
            };
        }
        zones.push("");
        zones
    }
}

fn normalize_name(name: &str) -> Arc<str> {
    let trimmed = name.trim();
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    Arc::from(trimmed)
}

impl PartialEq for Question {
    fn eq(&self, other: &Self) -> bool {
        self.record_type == other.record_type
            && self.record_class == other.record_class
            && self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl Eq for Question {}

impl Hash for Question {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.name.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
        state.write_u8(0xff);
        self.record_type.hash(state);
        self.record_class.hash(state);
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {} {}", self.name, self.record_class, self.record_type)
    }
}
