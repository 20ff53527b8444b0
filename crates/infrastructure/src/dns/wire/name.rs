//! Domain name encoding (RFC 1035 §3.1) and compression-aware decoding
//! (RFC 1035 §4.1.4).

use ferrous_lookup_domain::DomainError;

pub const MAX_LABEL_LENGTH: usize = 63;
pub const MAX_NAME_LENGTH: usize = 255;

const POINTER_TAG: u8 = 0xC0;

/// Append `name` as uncompressed length-prefixed labels.
pub fn encode_name(name: &str, buf: &mut Vec<u8>) -> Result<(), DomainError> {
    let name = name.strip_suffix('.').unwrap_or(name);
    let start = buf.len();

    if !name.is_empty() {
        for label in name.split('.') {
            if label.is_empty() {
                return Err(DomainError::InvalidDomainName(format!(
                    "Empty label in '{}'",
                    name
                )));
            }
            if label.len() > MAX_LABEL_LENGTH {
                return Err(DomainError::InvalidDomainName(format!(
                    "Label '{}' exceeds {} bytes",
                    label, MAX_LABEL_LENGTH
                )));
            }
            buf.push(label.len() as u8);
            buf.extend_from_slice(label.as_bytes());
        }
    }
    buf.push(0);

    if buf.len() - start > MAX_NAME_LENGTH {
        return Err(DomainError::InvalidDomainName(format!(
            "Name '{}' exceeds {} bytes",
            name, MAX_NAME_LENGTH
        )));
    }

    Ok(())
}

/// Decode the name starting at `offset`.
///
/// Returns the dotted name (no trailing dot, root is `""`) and the offset of
/// the first byte after the name as it appears at `offset`. Every pointer
/// must target a position before the segment it was reached from, which
/// rules out loops.
pub fn decode_name(message: &[u8], offset: usize) -> Result<(String, usize), DomainError> {
    let mut labels: Vec<String> = Vec::new();
    let mut pos = offset;
    let mut segment_start = offset;
    let mut resume_at: Option<usize> = None;
    let mut wire_len = 1usize;

    loop {
        let len = *message
            .get(pos)
            .ok_or_else(|| DomainError::malformed(format!("Name at {} runs past end", offset)))?;

        match len & POINTER_TAG {
            0x00 => {
                if len == 0 {
                    pos += 1;
                    break;
                }
                let start = pos + 1;
                let end = start + len as usize;
                let label = message.get(start..end).ok_or_else(|| {
                    DomainError::malformed(format!("Label at {} runs past end", pos))
                })?;

                wire_len += label.len() + 1;
                if wire_len > MAX_NAME_LENGTH {
                    return Err(DomainError::malformed(format!(
                        "Name at {} exceeds {} bytes",
                        offset, MAX_NAME_LENGTH
                    )));
                }

                // Names travel as dotted strings, so a label must not carry
                // a dot of its own or bytes that do not survive as text.
                let text = std::str::from_utf8(label).map_err(|_| {
                    DomainError::malformed(format!("Label at {} is not valid UTF-8", pos))
                })?;
                if text.contains('.') {
                    return Err(DomainError::malformed(format!(
                        "Label at {} contains a '.' byte",
                        pos
                    )));
                }
                labels.push(text.to_owned());
                pos = end;
            }
            POINTER_TAG => {
                let low = *message.get(pos + 1).ok_or_else(|| {
                    DomainError::malformed(format!("Truncated pointer at {}", pos))
                })?;
                let target = (usize::from(len & !POINTER_TAG) << 8) | usize::from(low);

                if target >= segment_start {
                    return Err(DomainError::malformed(format!(
                        "Pointer at {} does not point backward (target {})",
                        pos, target
                    )));
                }

                resume_at.get_or_insert(pos + 2);
                segment_start = target;
                pos = target;
            }
            other => {
                return Err(DomainError::malformed(format!(
                    "Unsupported label type 0x{:02x} at {}",
                    other, pos
                )));
            }
        }
    }

    Ok((labels.join("."), resume_at.unwrap_or(pos)))
}
