use serde::{Deserialize, Serialize};
use std::fmt;

/// Deterministic content hash of a ledger (BLAKE3 over every record).
///
/// Two ledgers with the same records in the same order share a hash, so
/// exported reports can be traced back to the exact input they came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl DatasetHash {
    pub fn from_hash(hash: &str) -> Self {
        Self(hash.to_string())
    }

    /// First 12 characters, enough for directory names and log lines.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(12) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_truncates_long_hash() {
        let hash = DatasetHash::from_hash("0123456789abcdef0123");
        assert_eq!(hash.short(), "0123456789ab");
    }

    #[test]
    fn short_respects_char_boundaries() {
        let hash = DatasetHash::from_hash("abééééééééééé");
        assert_eq!(hash.short(), "abéééééééééé");
    }

    #[test]
    fn short_keeps_short_hash() {
        assert_eq!(DatasetHash::from_hash("abc").short(), "abc");
    }
}
