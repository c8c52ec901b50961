use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// -------------------------
// Error body
// -------------------------

/// JSON body of every error response: `{"error": "...", "details"?: "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}

// -------------------------
// API Error Type
// -------------------------

/// Stable message for delivery failures; the cause goes in `details`.
pub const DELIVERY_FAILED_MESSAGE: &str = "Failed to send push notification";

/// Stable message for storage and other server-side faults.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Gone: {0}")]
    Gone(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Delivery failed: {details}")]
    DeliveryFailed { details: String },
    /// The message is for logs only; clients see [`INTERNAL_ERROR_MESSAGE`].
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
    pub fn gone(msg: impl Into<String>) -> Self {
        Self::Gone(msg.into())
    }
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
    pub fn delivery_failed(details: impl Into<String>) -> Self {
        Self::DeliveryFailed {
            details: details.into(),
        }
    }
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Gone(_) => StatusCode::GONE,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::DeliveryFailed { .. } | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Gone(msg)
            | ApiError::Conflict(msg) => ErrorBody::new(msg.clone()),
            ApiError::DeliveryFailed { details } => ErrorBody {
                error: DELIVERY_FAILED_MESSAGE.into(),
                details: Some(details.clone()),
            },
            ApiError::Internal(_) => ErrorBody::new(INTERNAL_ERROR_MESSAGE),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        json_response(self.status_code(), &self.to_body(), Vec::new())
    }
}

// -------------------------
// API Response Wrapper
// -------------------------

/// `{"message": "..."}` acknowledgement, with the new id on creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub value: T,
    pub status: StatusCode,
    pub headers: Vec<(HeaderName, HeaderValue)>,
}

impl<T> ApiResponse<T> {
    pub fn new(value: T, status: StatusCode) -> Self {
        Self {
            value,
            status,
            headers: Vec::new(),
        }
    }

    pub fn ok(value: T) -> Self {
        Self::new(value, StatusCode::OK)
    }

    pub fn created(value: T) -> Self {
        Self::new(value, StatusCode::CREATED)
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.push((name, value));
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        json_response(self.status, &self.value, self.headers)
    }
}

fn json_response<T: Serialize>(
    status: StatusCode,
    value: &T,
    headers: Vec<(HeaderName, HeaderValue)>,
) -> Response {
    let (status, body) = match serde_json::to_vec(value) {
        Ok(b) => (status, b),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::to_vec(&ErrorBody::new(INTERNAL_ERROR_MESSAGE))
                .unwrap_or_else(|_| b"{}".to_vec()),
        ),
    };

    let mut response = Response::new(axum::body::Body::from(body));
    *response.status_mut() = status;
    let response_headers = response.headers_mut();
    response_headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    for (n, v) in headers {
        response_headers.insert(n, v);
    }
    response
}
