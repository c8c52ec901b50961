pub mod webpush;

use async_trait::async_trait;
use pushhub_core::{PushPayload, Subscription};

use crate::error::DeliveryError;
use crate::types::DeliveryResult;

pub use webpush::WebPushDelivery;

/// Sends one payload to one subscription.
///
/// Rejections by the push service come back as `Ok` with a failed
/// [`DeliveryResult`]; `Err` is reserved for faults on our side (bad keys,
/// encryption failure) and callers treat it as a failure without a status.
#[async_trait]
pub trait PushDelivery: Send + Sync {
    /// Adapter name for logging and metrics.
    fn name(&self) -> &str;

    async fn send(
        &self,
        subscription: &Subscription,
        payload: &PushPayload,
    ) -> Result<DeliveryResult, DeliveryError>;
}
