use serde::{Deserialize, Serialize};

use crate::constants::ADDRESS_HEX_LEN;
use crate::error::ValidationError;

// Ledger object id of a vote (0x-prefixed hex)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct VoteId(pub String);

impl VoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 10 characters, for log fields.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(10) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl std::fmt::Display for VoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VoteId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Parse a full-length account address (`0x` + 64 hex chars) and return
/// it lowercased so that comparisons are case-insensitive.
pub fn parse_address(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    let hex_part = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| ValidationError::MalformedAddress(raw.to_string()))?;

    if hex_part.len() != ADDRESS_HEX_LEN || hex::decode(hex_part).is_err() {
        return Err(ValidationError::MalformedAddress(raw.to_string()));
    }

    Ok(format!("0x{}", hex_part.to_ascii_lowercase()))
}

/// Canonical form of an object or package id for equality checks.
///
/// The ledger prints ids both zero-padded and short (`0x2` vs `0x00..02`),
/// so leading zeros are stripped.
pub fn canonical_object_id(raw: &str) -> String {
    let hex_part = raw
        .trim()
        .trim_start_matches("0x")
        .trim_start_matches("0X")
        .trim_start_matches('0')
        .to_ascii_lowercase();
    if hex_part.is_empty() {
        "0x0".to_string()
    } else {
        format!("0x{hex_part}")
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_normalizes_case() {
        let raw = format!("0x{}", "AB".repeat(32));
        assert_eq!(parse_address(&raw).unwrap(), format!("0x{}", "ab".repeat(32)));
    }

    #[test]
    fn test_parse_address_rejects_malformed() {
        assert!(parse_address("not-an-address").is_err());
        assert!(parse_address("0x1234").is_err());
        assert!(parse_address(&"a".repeat(66)).is_err());
        assert!(parse_address(&format!("0x{}", "zz".repeat(32))).is_err());
    }

    #[test]
    fn test_short_id() {
        assert_eq!(VoteId::new(format!("0x{}", "ab".repeat(32))).short(), "0xabababab");
        assert_eq!(VoteId::new("0x77").short(), "0x77");
        // Cut lands inside a two-byte character when counted in bytes
        assert_eq!(VoteId::new("0x1234567é89").short(), "0x1234567é");
        assert_eq!(VoteId::default().short(), "");
    }

    #[test]
    fn test_canonical_object_id() {
        assert_eq!(canonical_object_id("0x0002"), "0x2");
        assert_eq!(canonical_object_id("0x2"), "0x2");
        assert_eq!(canonical_object_id("0xABC"), "0xabc");
        assert_eq!(canonical_object_id("0x000"), "0x0");
    }
}
