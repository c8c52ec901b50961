//! Scripted delivery adapter and fault-injecting store for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use pushhub_core::{NewSubscription, PushPayload, Subscription, SubscriptionId};
use pushhub_db_memory::InMemoryStore;
use pushhub_notifications::{DeliveryError, DeliveryResult, PushDelivery};
use pushhub_storage::{StorageError, SubscriptionStore};

#[derive(Clone)]
pub enum Behavior {
    Respond(DeliveryResult),
    Fail(String),
    Panic,
}

/// Answers per endpoint; unscripted endpoints get a 201.
#[derive(Default)]
pub struct StubDelivery {
    script: Mutex<HashMap<String, Behavior>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    sent: Mutex<Vec<(String, PushPayload)>>,
}

impl StubDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn script(&self, endpoint: &str, behavior: Behavior) {
        self.script
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), behavior);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<(String, PushPayload)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushDelivery for StubDelivery {
    fn name(&self) -> &str {
        "stub"
    }

    async fn send(
        &self,
        subscription: &Subscription,
        payload: &PushPayload,
    ) -> Result<DeliveryResult, DeliveryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.sent
            .lock()
            .unwrap()
            .push((subscription.endpoint.clone(), payload.clone()));

        let behavior = self
            .script
            .lock()
            .unwrap()
            .get(&subscription.endpoint)
            .cloned();
        match behavior {
            None => Ok(DeliveryResult::success(201)),
            Some(Behavior::Respond(result)) => Ok(result),
            Some(Behavior::Fail(msg)) => Err(DeliveryError::Encryption(msg)),
            Some(Behavior::Panic) => panic!("stub delivery panicked"),
        }
    }
}

/// Cause carried by every injected fault.
pub const FAULT_CAUSE: &str = "connection refused by 10.0.0.7:5432";

/// In-memory store with switchable connection faults.
#[derive(Default)]
pub struct FaultyStore {
    inner: InMemoryStore,
    fail_list: bool,
    fail_delete: bool,
    fail_lookups: bool,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    /// `find_by_id` and `find_by_endpoint` both fail.
    pub fn failing_lookups(mut self) -> Self {
        self.fail_lookups = true;
        self
    }

    fn fault(&self, on: bool) -> Result<(), StorageError> {
        if on {
            Err(StorageError::connection_error(FAULT_CAUSE))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SubscriptionStore for FaultyStore {
    async fn insert(&self, subscription: NewSubscription) -> Result<Subscription, StorageError> {
        self.inner.insert(subscription).await
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, StorageError> {
        self.fault(self.fail_lookups)?;
        self.inner.find_by_id(id).await
    }

    async fn find_by_endpoint(&self, endpoint: &str) -> Result<Option<Subscription>, StorageError> {
        self.fault(self.fail_lookups)?;
        self.inner.find_by_endpoint(endpoint).await
    }

    async fn delete(&self, id: &SubscriptionId) -> Result<bool, StorageError> {
        self.fault(self.fail_delete)?;
        self.inner.delete(id).await
    }

    async fn list_all(&self) -> Result<Vec<Subscription>, StorageError> {
        self.fault(self.fail_list)?;
        self.inner.list_all().await
    }

    fn backend_name(&self) -> &'static str {
        "faulty"
    }
}
