//! The subscription store contract.

use std::sync::Arc;

use async_trait::async_trait;
use pushhub_core::{NewSubscription, Subscription, SubscriptionId};

use crate::error::StorageError;

/// Durable collection of push subscriptions keyed by [`SubscriptionId`].
///
/// Backends assign the id and creation timestamp on insert and must reject a
/// second live record with the same endpoint with
/// [`StorageError::AlreadyExists`]. Implementations must be thread-safe
/// (`Send + Sync`); callers share one instance across requests and the
/// background sweep.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Persists a new subscription with a fresh id and the current time.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if the endpoint is already stored.
    async fn insert(&self, subscription: NewSubscription) -> Result<Subscription, StorageError>;

    /// Reads a subscription by id. Returns `None` if it does not exist.
    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, StorageError>;

    /// Reads the subscription registered for an endpoint, if any.
    async fn find_by_endpoint(&self, endpoint: &str)
    -> Result<Option<Subscription>, StorageError>;

    /// Removes a subscription. Returns `true` if a record was deleted.
    async fn delete(&self, id: &SubscriptionId) -> Result<bool, StorageError>;

    /// Lists every stored subscription, in no particular order.
    async fn list_all(&self) -> Result<Vec<Subscription>, StorageError>;

    /// Short backend name for logs (`"memory"`, `"postgres"`).
    fn backend_name(&self) -> &'static str;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }

    /// Releases backend resources. Called once during shutdown.
    async fn close(&self) {}
}

/// Type alias for a shareable store instance.
pub type DynSubscriptionStore = Arc<dyn SubscriptionStore>;
