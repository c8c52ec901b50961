use thiserror::Error;

/// Faults raised before a push request reaches the push service.
///
/// A push service rejecting the request is not an error: that comes back as
/// a failed [`DeliveryResult`](crate::DeliveryResult).
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Invalid VAPID configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to sign VAPID JWT: {0}")]
    Vapid(String),

    #[error("Failed to encrypt push message: {0}")]
    Encryption(String),

    #[error("Failed to serialize payload: {0}")]
    Payload(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}
