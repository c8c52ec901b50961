//! # pushhub-storage
//!
//! Storage abstraction layer for the pushhub server.
//!
//! This crate defines the [`SubscriptionStore`] contract and its error type.
//! Implementations live in `pushhub-db-memory` and `pushhub-db-postgres`.
//!
//! ## Example
//!
//! ```ignore
//! use pushhub_storage::{StorageError, SubscriptionStore};
//!
//! async fn endpoint_taken(
//!     store: &dyn SubscriptionStore,
//!     endpoint: &str,
//! ) -> Result<bool, StorageError> {
//!     Ok(store.find_by_endpoint(endpoint).await?.is_some())
//! }
//! ```

mod error;
mod traits;

pub use error::{ErrorCategory, StorageError};
pub use traits::{DynSubscriptionStore, SubscriptionStore};
