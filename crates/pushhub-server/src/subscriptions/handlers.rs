//! HTTP handlers for subscription endpoints.
//!
//! - `POST /subscriptions`
//! - `GET /subscriptions`
//! - `GET /subscriptions/{id}`
//! - `DELETE /subscriptions/{id}`
//! - `POST /send-push/{id}`

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use pushhub_api::{ApiError, ApiResponse, MessageBody};
use pushhub_core::{
    MISSING_PAYLOAD_FIELDS, MISSING_SUBSCRIPTION_FIELDS, NewSubscription, PushPayload,
    Subscription,
};
use serde::Deserialize;
use tracing::debug;

use super::dispatch::SendOutcome;
use super::error::{MSG_GONE, MSG_NOT_FOUND};
use crate::server::AppState;

/// Registration body as sent by `PushSubscription.toJSON()`.
///
/// Every field is optional here so that an incomplete body reaches
/// validation and gets the fixed missing-fields message.
#[derive(Debug, Default, Deserialize)]
pub struct CreateSubscriptionRequest {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub keys: Option<KeysRequest>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KeysRequest {
    #[serde(default)]
    pub p256dh: Option<String>,
    #[serde(default)]
    pub auth: Option<String>,
}

impl From<CreateSubscriptionRequest> for NewSubscription {
    fn from(req: CreateSubscriptionRequest) -> Self {
        let keys = req.keys.unwrap_or_default();
        NewSubscription::new(
            req.endpoint.unwrap_or_default(),
            keys.p256dh.unwrap_or_default(),
            keys.auth.unwrap_or_default(),
        )
    }
}

/// Unwraps a JSON body, answering any rejection with the route's fixed
/// missing-fields message. The parser's own text stays in the logs.
fn json_body<T>(
    body: Result<Json<T>, JsonRejection>,
    message: &'static str,
) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            debug!(
                status = %rejection.status(),
                error = %rejection.body_text(),
                "Rejected request body"
            );
            Err(ApiError::bad_request(message))
        }
    }
}

pub async fn create_subscription(
    State(state): State<AppState>,
    body: Result<Json<CreateSubscriptionRequest>, JsonRejection>,
) -> Result<ApiResponse<MessageBody>, ApiError> {
    let req = json_body(body, MISSING_SUBSCRIPTION_FIELDS)?;
    let id = state.registry.create(req.into()).await?;
    Ok(ApiResponse::created(
        MessageBody::new("Subscription created").with_id(id.to_string()),
    ))
}

pub async fn list_subscriptions(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Subscription>>, ApiError> {
    Ok(ApiResponse::ok(state.registry.get_all().await?))
}

pub async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Subscription>, ApiError> {
    match state.registry.get_by_id(&id).await? {
        Some(subscription) => Ok(ApiResponse::ok(subscription)),
        None => Err(ApiError::not_found(MSG_NOT_FOUND)),
    }
}

pub async fn delete_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<MessageBody>, ApiError> {
    if state.registry.delete(&id).await? {
        Ok(ApiResponse::ok(MessageBody::new("Subscription deleted")))
    } else {
        Err(ApiError::not_found(MSG_NOT_FOUND))
    }
}

pub async fn send_push(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<PushPayload>, JsonRejection>,
) -> Result<ApiResponse<MessageBody>, ApiError> {
    let payload = json_body(body, MISSING_PAYLOAD_FIELDS)?;
    match state.dispatcher.send_to(&id, &payload).await? {
        SendOutcome::Delivered => Ok(ApiResponse::ok(MessageBody::new("Push notification sent"))),
        SendOutcome::Gone => Err(ApiError::gone(MSG_GONE)),
        SendOutcome::DeliveryFailed { error } => Err(ApiError::delivery_failed(error)),
    }
}
