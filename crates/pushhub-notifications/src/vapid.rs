//! VAPID credentials (RFC 8292).
//!
//! The private key is the raw 32-byte P-256 scalar and the public key the
//! uncompressed SEC1 point (65 bytes), both base64url without padding. This
//! is the format `web-push` generate tools emit and the one
//! `VapidSignatureBuilder::from_base64` expects.

use std::fmt;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD as BASE64URL};
use p256::ecdsa::SigningKey;
use p256::elliptic_curve::rand_core::OsRng;
use serde::{Deserialize, Serialize};

use crate::error::DeliveryError;

/// `[vapid]` configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VapidConfig {
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub private_key: String,
    /// Contact for the push service operator, `mailto:` or `https:` URL.
    #[serde(default = "default_subject")]
    pub subject: String,
}

fn default_subject() -> String {
    "mailto:admin@localhost".into()
}

impl Default for VapidConfig {
    fn default() -> Self {
        Self {
            public_key: String::new(),
            private_key: String::new(),
            subject: default_subject(),
        }
    }
}

impl VapidConfig {
    /// Validates the section and decodes the key pair.
    pub fn keys(&self) -> Result<VapidKeys, DeliveryError> {
        if self.public_key.is_empty() || self.private_key.is_empty() {
            return Err(DeliveryError::InvalidConfig(
                "vapid.public_key and vapid.private_key must be defined".into(),
            ));
        }
        if !(self.subject.starts_with("mailto:") || self.subject.starts_with("https://")) {
            return Err(DeliveryError::InvalidConfig(format!(
                "vapid.subject must be a mailto: or https: URL, got '{}'",
                self.subject
            )));
        }
        VapidKeys::from_base64url(&self.public_key, &self.private_key)
    }
}

/// Decoded and cross-checked VAPID key pair.
#[derive(Clone)]
pub struct VapidKeys {
    private_key_b64: String,
    public_key_b64: String,
}

impl VapidKeys {
    /// Generate a fresh VAPID keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut OsRng);
        Self::from_signing_key(&signing_key)
    }

    fn from_signing_key(signing_key: &SigningKey) -> Self {
        let public_point = signing_key.verifying_key().to_encoded_point(false);
        Self {
            private_key_b64: BASE64URL.encode(signing_key.to_bytes().as_slice()),
            public_key_b64: BASE64URL.encode(public_point.as_bytes()),
        }
    }

    /// Reconstructs a key pair from configuration.
    ///
    /// Rejects keys that do not decode, have the wrong length, or whose
    /// public half was not derived from the private scalar.
    pub fn from_base64url(public_key_b64: &str, private_key_b64: &str) -> Result<Self, DeliveryError> {
        let pub_bytes = BASE64URL
            .decode(public_key_b64.trim_end_matches('='))
            .map_err(|e| DeliveryError::InvalidConfig(format!("VAPID public key: {e}")))?;
        if pub_bytes.len() != 65 || pub_bytes[0] != 0x04 {
            return Err(DeliveryError::InvalidConfig(
                "VAPID public key must be a 65-byte uncompressed P-256 point".into(),
            ));
        }

        let priv_bytes = BASE64URL
            .decode(private_key_b64.trim_end_matches('='))
            .map_err(|e| DeliveryError::InvalidConfig(format!("VAPID private key: {e}")))?;
        if priv_bytes.len() != 32 {
            return Err(DeliveryError::InvalidConfig(format!(
                "VAPID private key must be a 32-byte P-256 scalar, got {} bytes",
                priv_bytes.len()
            )));
        }
        let signing_key = SigningKey::from_bytes(priv_bytes.as_slice().into()).map_err(|_| {
            DeliveryError::InvalidConfig("VAPID private key is not a valid P-256 scalar".into())
        })?;

        let derived = Self::from_signing_key(&signing_key);
        if BASE64URL.encode(&pub_bytes) != derived.public_key_b64 {
            return Err(DeliveryError::InvalidConfig(
                "VAPID public key does not match the private key".into(),
            ));
        }

        Ok(derived)
    }

    /// Base64url public key; browsers pass it as `applicationServerKey`.
    pub fn public_key_base64url(&self) -> &str {
        &self.public_key_b64
    }

    /// Base64url raw private scalar.
    pub fn private_key_base64url(&self) -> &str {
        &self.private_key_b64
    }
}

impl fmt::Debug for VapidKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VapidKeys")
            .field("public_key", &self.public_key_b64)
            .field("private_key", &"****")
            .finish()
    }
}
