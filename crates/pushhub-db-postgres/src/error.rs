//! Error types for the PostgreSQL subscription store.

use pushhub_storage::StorageError;
use sqlx_core::error::Error as SqlxError;

/// PostgreSQL error code for unique constraint violations (23505).
pub const PG_UNIQUE_VIOLATION: &str = "23505";

/// Checks if a sqlx error has a specific PostgreSQL error code.
pub fn has_pg_error_code(err: &SqlxError, code: &str) -> bool {
    if let SqlxError::Database(db_err) = err {
        db_err.code().as_deref() == Some(code)
    } else {
        false
    }
}

/// Checks if a sqlx error is a unique constraint violation.
pub fn is_unique_violation(err: &SqlxError) -> bool {
    has_pg_error_code(err, PG_UNIQUE_VIOLATION)
}

/// Errors specific to the PostgreSQL backend.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx_core::error::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl PostgresError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<PostgresError> for StorageError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::Connection(e) => StorageError::connection_error(e.to_string()),
            PostgresError::Migration(e) => StorageError::internal(format!("Migration error: {e}")),
            PostgresError::Config { message } => {
                StorageError::internal(format!("Configuration error: {message}"))
            }
        }
    }
}

/// Maps a query error to a storage error.
///
/// Pool exhaustion and I/O failures surface as connection errors so the
/// readiness check and the handlers can tell them apart from bad rows.
pub(crate) fn query_error(err: SqlxError) -> StorageError {
    match err {
        SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_) | SqlxError::Tls(_) => {
            StorageError::connection_error(err.to_string())
        }
        SqlxError::ColumnDecode { .. } | SqlxError::Decode(_) => {
            StorageError::corrupt_record(err.to_string())
        }
        other => StorageError::internal(other.to_string()),
    }
}

/// Result type alias for PostgreSQL operations.
pub type Result<T> = std::result::Result<T, PostgresError>;
