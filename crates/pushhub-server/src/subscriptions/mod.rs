//! Web Push subscriptions and delivery.
//!
//! ## Architecture
//!
//! ```text
//! POST /subscriptions ──────────► SubscriptionRegistry ──► SubscriptionStore
//!                                        ▲
//! POST /send-push/{id} ─► PushDispatcher ┤
//!                               │        │
//! interval ─────────► PushSweep │        │
//!                         │     ▼        │
//!                         └► PushDelivery (web push)
//!                                │
//!                                ▼
//!                         OutcomeHandler (410 → remove)
//! ```
//!
//! The registry owns the one-subscription-per-endpoint rule. Both delivery
//! paths hand every result to the [`OutcomeHandler`], which is the only
//! place a subscription is removed automatically.

pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod outcome;
pub mod registry;
pub mod sweep;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatch::{PushDispatcher, SendOutcome};
pub use error::{DispatchError, RegistryError};
pub use outcome::{Action, DeliverySource, Outcome, OutcomeHandler};
pub use registry::SubscriptionRegistry;
pub use sweep::{PushSweep, SweepReport};
