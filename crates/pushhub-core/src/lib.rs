//! Core types shared by every pushhub crate.
//!
//! - [`Subscription`]: one stored push endpoint with its credentials
//! - [`PushPayload`]: the notification body handed to the push service
//! - [`SubscriptionId`]: opaque store-assigned identifier

pub mod error;
pub mod id;
pub mod payload;
pub mod subscription;
pub mod timestamp;

pub use error::{CoreError, Result};
pub use id::SubscriptionId;
pub use payload::{MISSING_PAYLOAD_FIELDS, PushPayload, PushPayloadData};
pub use subscription::{
    MISSING_SUBSCRIPTION_FIELDS, NewSubscription, Subscription, SubscriptionKeys,
};
pub use timestamp::now_utc;
