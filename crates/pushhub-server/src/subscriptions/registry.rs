//! Subscription registry: one live subscription per endpoint.

use pushhub_core::{NewSubscription, Subscription, SubscriptionId};
use pushhub_storage::DynSubscriptionStore;
use tracing::{debug, info};

use super::error::RegistryError;
use crate::metrics;

/// Lookup, create and delete over the subscription store.
///
/// Ids arrive as strings from the HTTP layer. A malformed id can never name
/// a stored subscription, so it reads as absent rather than as an error.
#[derive(Clone)]
pub struct SubscriptionRegistry {
    store: DynSubscriptionStore,
}

impl SubscriptionRegistry {
    pub fn new(store: DynSubscriptionStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &DynSubscriptionStore {
        &self.store
    }

    /// All live subscriptions, in store order.
    pub async fn get_all(&self) -> Result<Vec<Subscription>, RegistryError> {
        Ok(self.store.list_all().await?)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Subscription>, RegistryError> {
        let Ok(id) = SubscriptionId::parse(id) else {
            return Ok(None);
        };
        Ok(self.store.find_by_id(&id).await?)
    }

    /// Registers a subscription and returns its new id.
    ///
    /// The endpoint lookup rejects the common duplicate; the store's own
    /// uniqueness check catches two creates racing past the lookup.
    pub async fn create(&self, subscription: NewSubscription) -> Result<SubscriptionId, RegistryError> {
        subscription.validate()?;

        if self
            .store
            .find_by_endpoint(&subscription.endpoint)
            .await?
            .is_some()
        {
            debug!(endpoint = %subscription.endpoint, "Subscription already exists");
            return Err(RegistryError::AlreadyExists {
                endpoint: subscription.endpoint,
            });
        }

        let created = self.store.insert(subscription).await?;
        metrics::record_subscription_created();
        info!(subscription_id = %created.id, endpoint = %created.endpoint, "Subscription created");
        Ok(created.id)
    }

    /// Returns whether a subscription was removed.
    pub async fn delete(&self, id: &str) -> Result<bool, RegistryError> {
        let Ok(id) = SubscriptionId::parse(id) else {
            return Ok(false);
        };
        self.remove(&id).await
    }

    pub(crate) async fn remove(&self, id: &SubscriptionId) -> Result<bool, RegistryError> {
        let removed = self.store.delete(id).await?;
        if removed {
            info!(subscription_id = %id, "Subscription deleted");
        }
        Ok(removed)
    }

    /// Store reachability, backs `/readyz`.
    pub async fn ping(&self) -> Result<(), RegistryError> {
        Ok(self.store.ping().await?)
    }
}
