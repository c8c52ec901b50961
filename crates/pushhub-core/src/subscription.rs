use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::{CoreError, Result};
use crate::id::SubscriptionId;

/// Browser-issued credentials for payload encryption.
/// Message for a registration lacking its endpoint or either key.
pub const MISSING_SUBSCRIPTION_FIELDS: &str =
    "Missing required fields: endpoint, keys.p256dh, keys.auth";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    /// Client P-256 ECDH public key (base64url).
    pub p256dh: String,
    /// Client auth secret (base64url).
    pub auth: String,
}

/// A stored push subscription.
///
/// Subscriptions are immutable once stored; the only way to change one is to
/// delete it and register again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: SubscriptionId,
    pub endpoint: String,
    pub keys: SubscriptionKeys,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Data needed to register a subscription, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

impl NewSubscription {
    pub fn new(
        endpoint: impl Into<String>,
        p256dh: impl Into<String>,
        auth: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            keys: SubscriptionKeys {
                p256dh: p256dh.into(),
                auth: auth.into(),
            },
        }
    }

    /// Reject registrations with an empty endpoint or empty keys.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() || self.keys.p256dh.is_empty() || self.keys.auth.is_empty() {
            return Err(CoreError::invalid_input(MISSING_SUBSCRIPTION_FIELDS));
        }
        Ok(())
    }

    /// Materialize the record the store persists.
    pub fn into_subscription(self, id: SubscriptionId, created_at: OffsetDateTime) -> Subscription {
        Subscription {
            id,
            endpoint: self.endpoint,
            keys: self.keys,
            created_at,
        }
    }
}
