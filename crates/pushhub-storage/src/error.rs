//! Storage error types for the subscription store.

use std::fmt;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The store's uniqueness constraint on `endpoint` rejected an insert.
    #[error("Subscription already exists for endpoint: {endpoint}")]
    AlreadyExists {
        /// The endpoint that is already registered.
        endpoint: String,
    },

    /// Failed to reach the storage backend.
    #[error("Connection error: {message}")]
    ConnectionError {
        /// Description of the connection error.
        message: String,
    },

    /// A stored row could not be decoded into a subscription.
    #[error("Corrupt record: {message}")]
    CorruptRecord {
        /// Description of what failed to decode.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `AlreadyExists` error.
    #[must_use]
    pub fn already_exists(endpoint: impl Into<String>) -> Self {
        Self::AlreadyExists {
            endpoint: endpoint.into(),
        }
    }

    /// Creates a new `ConnectionError` error.
    #[must_use]
    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
        }
    }

    /// Creates a new `CorruptRecord` error.
    #[must_use]
    pub fn corrupt_record(message: impl Into<String>) -> Self {
        Self::CorruptRecord {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is an already exists error.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AlreadyExists { .. } => ErrorCategory::Conflict,
            Self::ConnectionError { .. } => ErrorCategory::Infrastructure,
            Self::CorruptRecord { .. } | Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of storage errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Uniqueness conflict.
    Conflict,
    /// Infrastructure/connection error.
    Infrastructure,
    /// Internal error.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict => write!(f, "conflict"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
