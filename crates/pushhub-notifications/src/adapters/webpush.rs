//! Web Push adapter (RFC 8030 transport, RFC 8291 encryption, RFC 8292 VAPID).

use std::time::Duration;

use async_trait::async_trait;
use pushhub_core::{PushPayload, Subscription};
use reqwest::Client;
use web_push::{
    ContentEncoding, SubscriptionInfo, VapidSignatureBuilder, WebPushMessage,
    WebPushMessageBuilder,
};

use super::PushDelivery;
use crate::error::DeliveryError;
use crate::types::DeliveryResult;
use crate::vapid::{VapidConfig, VapidKeys};

/// Default message TTL on the push service: four weeks.
pub const DEFAULT_TTL_SECS: u32 = 2_419_200;

/// Production [`PushDelivery`] backed by real push services.
pub struct WebPushDelivery {
    client: Client,
    keys: VapidKeys,
    subject: String,
    ttl_secs: u32,
}

impl WebPushDelivery {
    /// Builds the adapter from the `[vapid]` section.
    ///
    /// Fails when the keys are missing or malformed, so a misconfigured
    /// server refuses to start instead of failing every send.
    pub fn new(config: &VapidConfig, ttl_secs: u32) -> Result<Self, DeliveryError> {
        let keys = config.keys()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| DeliveryError::Client(e.to_string()))?;

        Ok(Self::with_client(client, keys, config.subject.clone(), ttl_secs))
    }

    /// Create with a custom client.
    pub fn with_client(client: Client, keys: VapidKeys, subject: String, ttl_secs: u32) -> Self {
        Self {
            client,
            keys,
            subject,
            ttl_secs,
        }
    }

    pub fn public_key(&self) -> &str {
        self.keys.public_key_base64url()
    }

    fn build_message(
        &self,
        subscription: &Subscription,
        payload: &[u8],
    ) -> Result<WebPushMessage, DeliveryError> {
        let sub_info = SubscriptionInfo::new(
            &subscription.endpoint,
            &subscription.keys.p256dh,
            &subscription.keys.auth,
        );

        let mut sig_builder =
            VapidSignatureBuilder::from_base64(self.keys.private_key_base64url(), &sub_info)
                .map_err(|e| DeliveryError::Vapid(e.to_string()))?;
        sig_builder.add_claim("sub", self.subject.as_str());
        let signature = sig_builder
            .build()
            .map_err(|e| DeliveryError::Vapid(e.to_string()))?;

        let mut builder = WebPushMessageBuilder::new(&sub_info);
        builder.set_payload(ContentEncoding::Aes128Gcm, payload);
        builder.set_vapid_signature(signature);
        builder.set_ttl(self.ttl_secs);

        builder
            .build()
            .map_err(|e| DeliveryError::Encryption(e.to_string()))
    }
}

#[async_trait]
impl PushDelivery for WebPushDelivery {
    fn name(&self) -> &str {
        "web-push"
    }

    async fn send(
        &self,
        subscription: &Subscription,
        payload: &PushPayload,
    ) -> Result<DeliveryResult, DeliveryError> {
        let body = payload
            .to_bytes()
            .map_err(|e| DeliveryError::Payload(e.to_string()))?;
        let message = self.build_message(subscription, &body)?;

        let mut request = self
            .client
            .post(message.endpoint.to_string())
            .header("TTL", message.ttl.to_string());

        if let Some(urgency) = message.urgency {
            request = request.header("Urgency", urgency.to_string());
        }

        if let Some(topic) = message.topic {
            request = request.header("Topic", topic);
        }

        if let Some(push_payload) = message.payload {
            request = request
                .header("Content-Encoding", push_payload.content_encoding.to_str())
                .header("Content-Type", "application/octet-stream");

            for (key, value) in &push_payload.crypto_headers {
                request = request.header(*key, value.as_str());
            }

            request = request.body(push_payload.content);
        }

        match request.send().await {
            Ok(resp) => {
                let status = resp.status().as_u16();

                if resp.status().is_success() {
                    tracing::debug!(
                        subscription_id = %subscription.id,
                        status_code = status,
                        "Push service accepted message"
                    );
                    Ok(DeliveryResult::success(status))
                } else {
                    let error_body = resp.text().await.unwrap_or_default();
                    tracing::warn!(
                        subscription_id = %subscription.id,
                        endpoint = %subscription.endpoint,
                        status_code = status,
                        error = %error_body,
                        "Push service rejected message"
                    );
                    Ok(DeliveryResult::http_failure(
                        status,
                        format!("HTTP {status}: {error_body}"),
                    ))
                }
            }
            Err(e) => {
                tracing::warn!(
                    subscription_id = %subscription.id,
                    endpoint = %subscription.endpoint,
                    error = %e,
                    "Push delivery failed with network error"
                );
                Ok(DeliveryResult::failure(e.to_string()))
            }
        }
    }
}
