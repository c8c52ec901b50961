//! Push delivery for the pushhub server.
//!
//! [`PushDelivery`] is the capability the registry, on-demand send and sweep
//! depend on. [`WebPushDelivery`] implements it against real push services:
//! VAPID signing and RFC 8291 encryption come from the `web-push` crate, the
//! HTTP request itself goes through `reqwest`.

pub mod adapters;
pub mod error;
pub mod types;
pub mod vapid;

pub use adapters::{PushDelivery, WebPushDelivery};
pub use error::DeliveryError;
pub use types::{DeliveryResult, STATUS_GONE};
pub use vapid::{VapidConfig, VapidKeys};
