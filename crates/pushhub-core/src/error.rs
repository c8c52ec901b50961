use thiserror::Error;

/// Core error types for pushhub operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid subscription ID: {0}")]
    InvalidId(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a new InvalidId error
    pub fn invalid_id(id: impl Into<String>) -> Self {
        Self::InvalidId(id.into())
    }

    /// Create a new InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
