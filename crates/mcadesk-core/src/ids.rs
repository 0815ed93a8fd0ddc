use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier for deals, merchants, documents and timeline records.
///
/// Stored sessions carry short ids such as `d-1` or `doc-7`; records opened
/// here get a v4 uuid. Nothing inspects the contents.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<Uuid> for RecordId {
    fn from(value: Uuid) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_session_ids_are_kept_verbatim() {
        let id: RecordId = serde_json::from_str("\"d-1\"").unwrap();
        assert_eq!(id, RecordId::from("d-1"));
        assert_eq!(id.to_string(), "d-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"d-1\"");
    }

    #[test]
    fn generated_ids_are_distinct_uuids() {
        let first = RecordId::generate();
        assert_ne!(first, RecordId::generate());
        assert!(Uuid::parse_str(first.as_str()).is_ok());
    }
}
