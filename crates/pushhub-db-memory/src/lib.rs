//! In-memory subscription store for the pushhub server.
//!
//! Backs tests and single-process deployments that do not need durability
//! (`storage.backend = "memory"`).
//!
//! # Example
//!
//! ```ignore
//! use pushhub_core::NewSubscription;
//! use pushhub_db_memory::InMemoryStore;
//! use pushhub_storage::SubscriptionStore;
//!
//! let store = InMemoryStore::new();
//! let created = store
//!     .insert(NewSubscription::new("https://push.example/a", "p256dh", "auth"))
//!     .await?;
//! ```

pub mod storage;

pub use pushhub_storage::{StorageError, SubscriptionStore};
pub use storage::InMemoryStore;

/// Creates a new in-memory store behind the shared trait object.
pub fn create_memory_store() -> pushhub_storage::DynSubscriptionStore {
    std::sync::Arc::new(InMemoryStore::new())
}
