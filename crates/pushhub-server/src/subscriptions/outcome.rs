//! Reaction to a delivery result.
//!
//! A 410 from the push service is the only automatic removal trigger. Every
//! other failure leaves the subscription in place.

use pushhub_core::SubscriptionId;
use pushhub_notifications::DeliveryResult;
use tracing::{info, warn};

use super::error::RegistryError;
use super::registry::SubscriptionRegistry;
use crate::metrics;

/// What the registry must do about a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Remove,
}

/// Result of applying a delivery result to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Delivered,
    /// The push service reported the endpoint gone; the subscription was deleted.
    Removed,
    Failed {
        status_code: Option<u16>,
        error: Option<String>,
    },
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Delivered => "delivered",
            Outcome::Removed => "removed",
            Outcome::Failed { .. } => "failed",
        }
    }
}

/// Where a delivery was triggered from, for logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliverySource {
    OnDemand,
    Sweep,
}

impl DeliverySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliverySource::OnDemand => "on_demand",
            DeliverySource::Sweep => "sweep",
        }
    }
}

#[derive(Clone)]
pub struct OutcomeHandler {
    registry: SubscriptionRegistry,
}

impl OutcomeHandler {
    pub fn new(registry: SubscriptionRegistry) -> Self {
        Self { registry }
    }

    pub fn classify(result: &DeliveryResult) -> Action {
        if result.is_gone() {
            Action::Remove
        } else {
            Action::None
        }
    }

    /// Applies `result` for subscription `id`.
    ///
    /// Only the removal can fail; when it does the delivery is not counted.
    pub async fn apply(
        &self,
        id: &SubscriptionId,
        result: &DeliveryResult,
        source: DeliverySource,
    ) -> Result<Outcome, RegistryError> {
        let outcome = match Self::classify(result) {
            Action::Remove => {
                // A concurrent delete may have won; the subscription is gone either way.
                if self.registry.remove(id).await? {
                    metrics::record_subscription_removed();
                }
                info!(
                    subscription_id = %id,
                    source = source.as_str(),
                    "Expired subscription removed"
                );
                Outcome::Removed
            }
            Action::None if result.success => Outcome::Delivered,
            Action::None => {
                warn!(
                    subscription_id = %id,
                    source = source.as_str(),
                    status_code = ?result.status_code,
                    error = result.error.as_deref().unwrap_or(""),
                    "Push delivery failed, subscription kept"
                );
                Outcome::Failed {
                    status_code: result.status_code,
                    error: result.error.clone(),
                }
            }
        };

        metrics::record_delivery(outcome.as_str(), source.as_str());
        Ok(outcome)
    }
}
