//! Document identifiers.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Length of a document identifier in hex characters.
pub const DOCUMENT_ID_LEN: usize = 24;

/// Returned when a string is not a well-formed [`DocumentId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid document id: {0:?}")]
pub struct InvalidDocumentId(pub String);

/// Unique identifier of a stored document.
///
/// 24 lowercase hex characters: a big-endian 4-byte creation timestamp
/// (seconds since the Unix epoch) followed by 8 random bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Generate a new identifier stamped with the current time.
    pub fn new() -> Self {
        Self::with_timestamp(Utc::now())
    }

    fn with_timestamp(at: DateTime<Utc>) -> Self {
        let secs = at.timestamp().clamp(0, u32::MAX as i64) as u32;
        let random = Uuid::new_v4();

        let mut id = String::with_capacity(DOCUMENT_ID_LEN);
        // Writing to a String cannot fail.
        let _ = write!(id, "{:08x}", secs);
        for byte in &random.as_bytes()[..8] {
            let _ = write!(id, "{:02x}", byte);
        }
        Self(id)
    }

    /// Parse an identifier, normalizing hex digits to lowercase.
    pub fn parse(s: &str) -> Result<Self, InvalidDocumentId> {
        if s.len() == DOCUMENT_ID_LEN && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(s.to_ascii_lowercase()))
        } else {
            Err(InvalidDocumentId(s.to_string()))
        }
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DocumentId {
    type Err = InvalidDocumentId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generated_ids_are_well_formed() {
        let id = DocumentId::new();
        assert_eq!(id.as_str().len(), DOCUMENT_ID_LEN);
        assert!(DocumentId::parse(id.as_str()).is_ok());
        assert_ne!(DocumentId::new(), DocumentId::new());
    }

    #[test]
    fn test_timestamp_prefix() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let id = DocumentId::with_timestamp(at);
        assert!(id.as_str().starts_with(&format!("{:08x}", at.timestamp())));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(DocumentId::parse("abc").is_err());
        assert!(DocumentId::parse("").is_err());
        assert!(DocumentId::parse("zzzzzzzzzzzzzzzzzzzzzzzz").is_err());
        assert!(DocumentId::parse("507f1f77bcf86cd7994390111").is_err());
    }

    #[test]
    fn test_parse_normalizes_case() {
        let id = DocumentId::parse("507F1F77BCF86CD799439011").unwrap();
        assert_eq!(id.as_str(), "507f1f77bcf86cd799439011");
    }
}
