//! Checksummed line format used by the file store.
//!
//! Every line in a store file carries its own CRC32:
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//! 0       8     checksum (CRC32 of the payload, lowercase hex)
//! 8       1     separator (single space)
//! 9       ..    payload (one JSON document, no newlines)
//! ```
//!
//! A line whose checksum does not match its payload was torn or edited by
//! hand; the store refuses to open rather than guess.

use crate::common::{Error, Result};

/// Width of the hex-encoded checksum.
pub const CHECKSUM_WIDTH: usize = 8;

/// Offset of the payload within a line.
pub const PAYLOAD_OFFSET: usize = CHECKSUM_WIDTH + 1;

/// Compute the CRC32 checksum of a payload.
pub fn compute_checksum(payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(payload);
    hasher.finalize()
}

/// Frame a payload as a store line (without the trailing newline).
///
/// `line_no` is 1-based and only used for error reporting.
///
/// # Errors
/// Returns `Error::Corrupted` if `payload` contains a line break, since the
/// line could not be read back as one record.
pub fn encode(payload: &str, line_no: usize) -> Result<String> {
    if payload.contains(|c: char| c == '\n' || c == '\r') {
        return Err(Error::Corrupted {
            line: line_no,
            reason: "payload spans more than one line".to_string(),
        });
    }
    Ok(format!("{:08x} {}", compute_checksum(payload.as_bytes()), payload))
}

/// Verify a store line and return its payload.
///
/// `line_no` is 1-based and only used for error reporting.
pub fn decode(line: &str, line_no: usize) -> Result<&str> {
    let corrupted = |reason: &str| Error::Corrupted {
        line: line_no,
        reason: reason.to_string(),
    };

    if line.len() < PAYLOAD_OFFSET || line.as_bytes()[CHECKSUM_WIDTH] != b' ' {
        return Err(corrupted("missing checksum"));
    }

    let stored = u32::from_str_radix(&line[..CHECKSUM_WIDTH], 16)
        .map_err(|_| corrupted("checksum is not hex"))?;
    let payload = &line[PAYLOAD_OFFSET..];

    if stored != compute_checksum(payload.as_bytes()) {
        return Err(corrupted("checksum mismatch"));
    }

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let line = encode("{}", 1).unwrap();
        assert_eq!(line.len(), PAYLOAD_OFFSET + 2);
        assert_eq!(&line[CHECKSUM_WIDTH..], " {}");
        assert_eq!(decode(&line, 1).unwrap(), "{}");
    }

    #[test]
    fn test_checksum_deterministic() {
        let a = compute_checksum(b"{\"id\":1}");
        let b = compute_checksum(b"{\"id\":1}");
        assert_eq!(a, b);
        assert_ne!(a, compute_checksum(b"{\"id\":2}"));
    }

    #[test]
    fn test_detects_tampering() {
        let line = encode("{\"city\":\"Oslo\"}", 4).unwrap().replace("Oslo", "Rome");
        let err = decode(&line, 4).unwrap_err();
        assert!(matches!(err, Error::Corrupted { line: 4, .. }));
    }

    #[test]
    fn test_rejects_short_and_malformed_lines() {
        assert!(decode("", 1).is_err());
        assert!(decode("deadbeef", 1).is_err());
        assert!(decode("zzzzzzzz {}", 1).is_err());
        assert!(decode("deadbeef_{}", 1).is_err());
    }

    #[test]
    fn test_encode_rejects_line_breaks() {
        let err = encode("a\nb", 7).unwrap_err();
        assert!(matches!(err, Error::Corrupted { line: 7, .. }));
        assert!(encode("a\rb", 1).is_err());
    }
}
