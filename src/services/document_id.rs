/*
 * Responsibility
 * - Document identifiers as seen by the HTTP layer (24 char hex ObjectId)
 * - Parsing from path segments and formatting back into `_id`
 * - Extractors and stores go through this type, never through raw strings
 *
 * No thiserror here:
 * - the error only describes a parse failure of this module
 * - callers map it straight into RepoError / AppError
 */
use mongodb::bson::oid::ObjectId;
use std::{error::Error, fmt, str::FromStr};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentIdError {
    Empty,
    InvalidFormat { value: String },
}

impl fmt::Display for DocumentIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentIdError::Empty => write!(f, "document id is empty"),
            DocumentIdError::InvalidFormat { value } => {
                write!(f, "invalid document id: {}", value)
            }
        }
    }
}

impl Error for DocumentIdError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DocumentId(ObjectId);

impl DocumentId {
    /// Fresh identifier, used by stores that assign ids themselves.
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl FromStr for DocumentId {
    type Err = DocumentIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DocumentIdError::Empty);
        }
        ObjectId::parse_str(s)
            .map(Self)
            .map_err(|_| DocumentIdError::InvalidFormat {
                value: s.to_string(),
            })
    }
}

impl From<ObjectId> for DocumentId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_object_id() {
        let id: DocumentId = "65a1f0c2e4b0a1b2c3d4e5f6".parse().unwrap();
        assert_eq!(id.to_hex(), "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(id.to_string(), "65a1f0c2e4b0a1b2c3d4e5f6");
    }

    #[test]
    fn rejects_malformed_ids() {
        assert_eq!("".parse::<DocumentId>(), Err(DocumentIdError::Empty));
        for bad in ["123", "not-an-id", "65a1f0c2e4b0a1b2c3d4e5fz", "65a1f0c2e4b0a1b2c3d4e5f6aa"] {
            assert!(
                matches!(
                    bad.parse::<DocumentId>(),
                    Err(DocumentIdError::InvalidFormat { .. })
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(DocumentId::generate(), DocumentId::generate());
    }
}
