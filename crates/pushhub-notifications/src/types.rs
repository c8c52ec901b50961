use serde::Serialize;

/// Status a push service returns for a subscription that no longer exists.
pub const STATUS_GONE: u16 = 410;

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryResult {
    /// Whether the push service accepted the message
    pub success: bool,

    /// HTTP status returned by the push service, when one was received
    pub status_code: Option<u16>,

    /// Error message if failed
    pub error: Option<String>,
}

impl DeliveryResult {
    /// Create a successful result.
    pub fn success(status_code: u16) -> Self {
        Self {
            success: true,
            status_code: Some(status_code),
            error: None,
        }
    }

    /// Create a failed result without a status (network error, timeout).
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            status_code: None,
            error: Some(error.into()),
        }
    }

    /// Create a failed result with HTTP status.
    pub fn http_failure(status_code: u16, error: impl Into<String>) -> Self {
        Self {
            success: false,
            status_code: Some(status_code),
            error: Some(error.into()),
        }
    }

    /// Failed with 410: the endpoint is permanently invalid.
    pub fn is_gone(&self) -> bool {
        !self.success && self.status_code == Some(STATUS_GONE)
    }
}
