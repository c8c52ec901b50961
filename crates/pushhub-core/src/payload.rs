use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Message for a payload lacking its title or body.
pub const MISSING_PAYLOAD_FIELDS: &str = "Missing required fields: title, body";

/// Optional data attached to a notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushPayloadData {
    /// URL the service worker opens when the notification is clicked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Notification content sent to a subscription.
///
/// `title` and `body` default to empty so that a request missing them
/// deserializes and is then rejected by [`PushPayload::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PushPayloadData>,
}

impl PushPayload {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            icon: None,
            data: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.data = Some(PushPayloadData {
            url: Some(url.into()),
        });
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.is_empty() || self.body.is_empty() {
            return Err(CoreError::invalid_input(MISSING_PAYLOAD_FIELDS));
        }
        Ok(())
    }

    /// JSON bytes handed to the push service for encryption.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_deserialize_then_fail_validation() {
        let payload: PushPayload = serde_json::from_value(json!({ "body": "B" })).unwrap();
        assert!(payload.title.is_empty());
        assert!(payload.validate().is_err());

        let payload: PushPayload = serde_json::from_value(json!({ "title": "T", "body": "" })).unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn test_serialization_skips_absent_optionals() {
        let bytes = PushPayload::new("T", "B").to_bytes().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, json!({ "title": "T", "body": "B" }));
    }

    #[test]
    fn test_full_payload() {
        let payload = PushPayload::new("T", "B")
            .with_icon("/icon-192x192.png")
            .with_url("/");
        assert!(payload.validate().is_ok());

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["icon"], "/icon-192x192.png");
        assert_eq!(value["data"]["url"], "/");
    }
}
