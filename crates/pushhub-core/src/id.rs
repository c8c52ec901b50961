use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::{CoreError, Result};

/// Store-assigned subscription identifier.
///
/// Backed by a random UUID so an id is never handed out twice, even after the
/// subscription it named has been deleted. On the wire it is a plain string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier received from a caller.
    pub fn parse(raw: &str) -> Result<Self> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| CoreError::invalid_id(raw))
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubscriptionId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for SubscriptionId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SubscriptionId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = SubscriptionId::generate();
        let b = SubscriptionId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_display_agree() {
        let id = SubscriptionId::generate();
        let parsed = SubscriptionId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(SubscriptionId::parse("not-an-id").is_err());
        assert!(SubscriptionId::parse("").is_err());
        assert!(SubscriptionId::parse("507f1f77bcf86cd799439011").is_err());
    }

    #[test]
    fn test_serializes_as_string() {
        let id = SubscriptionId::generate();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.to_string()));
    }
}
