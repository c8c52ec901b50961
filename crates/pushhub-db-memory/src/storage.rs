use std::sync::Arc;

use async_trait::async_trait;
use papaya::HashMap as PapayaHashMap;
use pushhub_core::{NewSubscription, Subscription, SubscriptionId, now_utc};
use pushhub_storage::{StorageError, SubscriptionStore};
use tracing::debug;

/// In-memory subscription store using papaya lock-free HashMaps.
///
/// `records` holds the subscriptions; `endpoints` maps each endpoint to the
/// id that owns it and is what enforces endpoint uniqueness: an insert only
/// lands in `records` after it has claimed its endpoint slot.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: Arc<PapayaHashMap<SubscriptionId, Subscription>>,
    endpoints: Arc<PapayaHashMap<String, SubscriptionId>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored subscriptions.
    pub fn len(&self) -> usize {
        self.records.pin().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SubscriptionStore for InMemoryStore {
    async fn insert(&self, subscription: NewSubscription) -> Result<Subscription, StorageError> {
        let id = SubscriptionId::generate();

        {
            let endpoints = self.endpoints.pin();
            if endpoints
                .try_insert(subscription.endpoint.clone(), id)
                .is_err()
            {
                return Err(StorageError::already_exists(subscription.endpoint));
            }
        }

        let stored = subscription.into_subscription(id, now_utc());
        self.records.pin().insert(id, stored.clone());

        debug!(subscription_id = %id, "Inserted subscription");
        Ok(stored)
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, StorageError> {
        let guard = self.records.pin();
        Ok(guard.get(id).cloned())
    }

    async fn find_by_endpoint(
        &self,
        endpoint: &str,
    ) -> Result<Option<Subscription>, StorageError> {
        let id = {
            let endpoints = self.endpoints.pin();
            match endpoints.get(endpoint) {
                Some(id) => *id,
                None => return Ok(None),
            }
        };
        let guard = self.records.pin();
        Ok(guard.get(&id).cloned())
    }

    async fn delete(&self, id: &SubscriptionId) -> Result<bool, StorageError> {
        let removed = {
            let guard = self.records.pin();
            guard.remove(id).cloned()
        };

        match removed {
            Some(subscription) => {
                self.endpoints.pin().remove(&subscription.endpoint);
                debug!(subscription_id = %id, "Deleted subscription");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_all(&self) -> Result<Vec<Subscription>, StorageError> {
        let guard = self.records.pin();
        Ok(guard.iter().map(|(_, sub)| sub.clone()).collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
