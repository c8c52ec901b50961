//! On-demand send to a single subscription.

use std::sync::Arc;

use pushhub_core::PushPayload;
use pushhub_notifications::{DeliveryResult, PushDelivery};
use tracing::{debug, warn};

use super::error::{DispatchError, client_message};
use super::outcome::{DeliverySource, Outcome, OutcomeHandler};
use super::registry::SubscriptionRegistry;

/// What happened to an on-demand send that reached the push service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    /// The push service answered 410; the subscription has been deleted.
    Gone,
    DeliveryFailed { error: String },
}

#[derive(Clone)]
pub struct PushDispatcher {
    registry: SubscriptionRegistry,
    delivery: Arc<dyn PushDelivery>,
    outcomes: OutcomeHandler,
}

impl PushDispatcher {
    pub fn new(registry: SubscriptionRegistry, delivery: Arc<dyn PushDelivery>) -> Self {
        let outcomes = OutcomeHandler::new(registry.clone());
        Self {
            registry,
            delivery,
            outcomes,
        }
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    pub fn delivery(&self) -> &Arc<dyn PushDelivery> {
        &self.delivery
    }

    /// Sends `payload` to the subscription named by `id`.
    ///
    /// The payload is checked before the lookup, so a bad payload for an
    /// unknown id is a 400 rather than a 404.
    pub async fn send_to(
        &self,
        id: &str,
        payload: &PushPayload,
    ) -> Result<SendOutcome, DispatchError> {
        payload
            .validate()
            .map_err(|e| DispatchError::InvalidPayload(client_message(e)))?;

        let subscription = self
            .registry
            .get_by_id(id)
            .await?
            .ok_or_else(|| DispatchError::NotFound(id.to_string()))?;

        debug!(
            subscription_id = %subscription.id,
            adapter = self.delivery.name(),
            "Sending push notification"
        );
        let result = match self.delivery.send(&subscription, payload).await {
            Ok(result) => result,
            Err(e) => {
                warn!(subscription_id = %subscription.id, error = %e, "Push delivery error");
                DeliveryResult::failure(e.to_string())
            }
        };

        let outcome = self
            .outcomes
            .apply(&subscription.id, &result, DeliverySource::OnDemand)
            .await?;

        Ok(match outcome {
            Outcome::Delivered => SendOutcome::Delivered,
            Outcome::Removed => SendOutcome::Gone,
            Outcome::Failed { error, status_code } => SendOutcome::DeliveryFailed {
                error: error.unwrap_or_else(|| match status_code {
                    Some(code) => format!("HTTP {code}"),
                    None => "Unknown delivery error".to_string(),
                }),
            },
        })
    }
}
