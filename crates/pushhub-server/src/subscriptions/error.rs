//! Subscription error types.

use pushhub_api::ApiError;
use pushhub_core::CoreError;
use pushhub_storage::StorageError;
use thiserror::Error;

pub const MSG_ALREADY_EXISTS: &str = "Subscription already exists";
pub const MSG_NOT_FOUND: &str = "Subscription not found";
pub const MSG_GONE: &str = "Subscription expired and was removed";

/// Errors from the subscription registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Registration data is incomplete
    #[error("{0}")]
    InvalidInput(String),

    /// A live subscription already uses this endpoint
    #[error("Subscription already exists for endpoint {endpoint}")]
    AlreadyExists { endpoint: String },

    /// Storage fault
    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for RegistryError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::AlreadyExists { endpoint } => Self::AlreadyExists { endpoint },
            other => Self::Storage(other),
        }
    }
}

impl From<CoreError> for RegistryError {
    fn from(err: CoreError) -> Self {
        Self::InvalidInput(client_message(err))
    }
}

/// Message shown to the caller for a validation failure.
pub(crate) fn client_message(err: CoreError) -> String {
    match err {
        CoreError::InvalidInput(msg) => msg,
        other => other.to_string(),
    }
}

/// Errors from an on-demand send, before or around the delivery attempt.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Payload is missing title or body
    #[error("{0}")]
    InvalidPayload(String),

    #[error("Subscription not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::InvalidInput(msg) => ApiError::bad_request(msg),
            RegistryError::AlreadyExists { .. } => ApiError::conflict(MSG_ALREADY_EXISTS),
            RegistryError::Storage(e) => {
                tracing::error!(error = %e, category = %e.category(), "Subscription storage fault");
                ApiError::internal(e.to_string())
            }
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::InvalidPayload(msg) => ApiError::bad_request(msg),
            DispatchError::NotFound(_) => ApiError::not_found(MSG_NOT_FOUND),
            DispatchError::Registry(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_storage_conflict_becomes_already_exists() {
        let err: RegistryError = StorageError::already_exists("https://push.example/a").into();
        assert!(matches!(err, RegistryError::AlreadyExists { .. }));

        let err: RegistryError = StorageError::connection_error("down").into();
        assert!(matches!(err, RegistryError::Storage(_)));
    }

    #[test]
    fn test_api_mapping() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (
                RegistryError::InvalidInput("x".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                RegistryError::AlreadyExists {
                    endpoint: "e".into(),
                }
                .into(),
                StatusCode::CONFLICT,
            ),
            (
                RegistryError::Storage(StorageError::internal("boom")).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                DispatchError::InvalidPayload("x".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (DispatchError::NotFound("id".into()).into(), StatusCode::NOT_FOUND),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status);
        }
    }
}
