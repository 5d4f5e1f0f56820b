//! VAPID key material for Web Push
//!
//! The application server identifies itself to push services with a P-256
//! keypair (RFC 8292). Keys travel as base64url without padding: the public
//! key as an uncompressed SEC1 point (65 bytes), the private key as the raw
//! 32-byte scalar.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::EncodePrivateKey;
use p256::SecretKey;
use serde::Serialize;

/// Lifetime of a signed VAPID token; RFC 8292 caps it at 24 hours
pub const VAPID_TOKEN_LIFETIME_HOURS: i64 = 12;

#[derive(Debug, thiserror::Error)]
pub enum VapidError {
    #[error("invalid base64url key: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("invalid P-256 private key")]
    InvalidPrivateKey,

    #[error("public key does not belong to the private key")]
    KeyMismatch,

    #[error("failed to sign VAPID token: {0}")]
    Signing(String),
}

/// A P-256 keypair used to sign VAPID tokens
#[derive(Clone)]
pub struct VapidKeyPair {
    secret: SecretKey,
}

impl VapidKeyPair {
    /// Generate a new keypair from the OS random source
    #[must_use]
    pub fn generate() -> Self {
        Self {
            secret: SecretKey::random(&mut rand::rngs::OsRng),
        }
    }

    /// Load a keypair from its base64url private key
    pub fn from_private_key(private_key: &str) -> Result<Self, VapidError> {
        let bytes = URL_SAFE_NO_PAD.decode(private_key.trim().trim_end_matches('='))?;
        let secret = SecretKey::from_slice(&bytes).map_err(|_| VapidError::InvalidPrivateKey)?;
        Ok(Self { secret })
    }

    /// Load a keypair and check the configured public half matches
    pub fn from_base64(public_key: &str, private_key: &str) -> Result<Self, VapidError> {
        let pair = Self::from_private_key(private_key)?;
        let expected = URL_SAFE_NO_PAD.decode(public_key.trim().trim_end_matches('='))?;
        if expected != pair.public_key_bytes() {
            return Err(VapidError::KeyMismatch);
        }
        Ok(pair)
    }

    fn public_key_bytes(&self) -> Vec<u8> {
        self.secret
            .public_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec()
    }

    /// Public key as handed to browsers (`applicationServerKey`)
    #[must_use]
    pub fn public_key_base64(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.public_key_bytes())
    }

    #[must_use]
    pub fn private_key_base64(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.secret.to_bytes())
    }

    fn encoding_key(&self) -> Result<EncodingKey, VapidError> {
        let der = self
            .secret
            .to_pkcs8_der()
            .map_err(|e| VapidError::Signing(e.to_string()))?;
        Ok(EncodingKey::from_ec_der(der.as_bytes()))
    }

    /// `Authorization` header value for a push service
    ///
    /// `audience` is the origin of the subscription endpoint
    /// (`https://push.example.net`), `subject` a `mailto:` or `https:` contact.
    pub fn authorization(&self, audience: &str, subject: &str) -> Result<String, VapidError> {
        #[derive(Serialize)]
        struct VapidClaims<'a> {
            aud: &'a str,
            exp: i64,
            sub: &'a str,
        }

        let claims = VapidClaims {
            aud: audience,
            exp: (Utc::now() + Duration::hours(VAPID_TOKEN_LIFETIME_HOURS)).timestamp(),
            sub: subject,
        };

        let token = encode(&Header::new(Algorithm::ES256), &claims, &self.encoding_key()?)
            .map_err(|e| VapidError::Signing(e.to_string()))?;

        Ok(format!("vapid t={token}, k={}", self.public_key_base64()))
    }
}

impl std::fmt::Debug for VapidKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VapidKeyPair")
            .field("public_key", &self.public_key_base64())
            .finish_non_exhaustive()
    }
}
