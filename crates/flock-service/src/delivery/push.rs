//! Web Push delivery

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_LENGTH};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use flock_common::VapidKeyPair;
use flock_core::entities::PushSubscription;

/// Notification content handed to a delivery backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Why a push could not be delivered
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The push service no longer knows the subscription (404/410)
    #[error("subscription expired at push service (HTTP {0})")]
    Gone(u16),

    #[error("push service rejected message (HTTP {0})")]
    Rejected(u16),

    #[error("push request failed: {0}")]
    Transport(String),

    #[error("invalid subscription endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("VAPID signing failed: {0}")]
    Signing(String),
}

/// Sends one notification to one subscription
#[async_trait]
pub trait PushDelivery: Send + Sync {
    async fn deliver(
        &self,
        subscription: &PushSubscription,
        message: &PushMessage,
    ) -> Result<(), DeliveryError>;
}

/// Payload-less Web Push sender authenticated with VAPID
///
/// The request carries no encrypted body, so the browser only receives a
/// wake-up event; the message itself is used for logging.
pub struct WebPushDelivery {
    client: reqwest::Client,
    keys: VapidKeyPair,
    subject: String,
    ttl_secs: u32,
}

impl WebPushDelivery {
    pub fn new(keys: VapidKeyPair, subject: impl Into<String>, ttl_secs: u32) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            keys,
            subject: subject.into(),
            ttl_secs,
        }
    }

    /// Build from config; `None` when VAPID keys are not configured
    pub fn from_config(
        config: &flock_common::PushConfig,
    ) -> Result<Option<Self>, flock_common::VapidError> {
        match (&config.vapid_public_key, &config.vapid_private_key) {
            (Some(public), Some(private)) => {
                let keys = VapidKeyPair::from_base64(public, private)?;
                Ok(Some(Self::new(
                    keys,
                    config.vapid_subject.clone(),
                    config.ttl_secs,
                )))
            }
            _ => Ok(None),
        }
    }

    pub fn public_key(&self) -> String {
        self.keys.public_key_base64()
    }
}

/// `scheme://host[:port]` of a push endpoint, the JWT audience
pub fn endpoint_audience(endpoint: &str) -> Result<String, DeliveryError> {
    let url = reqwest::Url::parse(endpoint)
        .map_err(|e| DeliveryError::InvalidEndpoint(e.to_string()))?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(DeliveryError::InvalidEndpoint(format!(
            "unsupported scheme {}",
            url.scheme()
        )));
    }
    let origin = url.origin();
    if !origin.is_tuple() {
        return Err(DeliveryError::InvalidEndpoint("endpoint has no host".to_string()));
    }
    Ok(origin.ascii_serialization())
}

#[async_trait]
impl PushDelivery for WebPushDelivery {
    #[instrument(skip(self, subscription, message), fields(subscription_id = %subscription.id))]
    async fn deliver(
        &self,
        subscription: &PushSubscription,
        message: &PushMessage,
    ) -> Result<(), DeliveryError> {
        let audience = endpoint_audience(&subscription.endpoint)?;
        let authorization = self
            .keys
            .authorization(&audience, &self.subject)
            .map_err(|e| DeliveryError::Signing(e.to_string()))?;
        let authorization = HeaderValue::from_str(&authorization)
            .map_err(|e| DeliveryError::Signing(e.to_string()))?;

        debug!(title = %message.title, "Sending push");
        let response = self
            .client
            .post(&subscription.endpoint)
            .header(AUTHORIZATION, authorization)
            .header("TTL", self.ttl_secs.to_string())
            .header(CONTENT_LENGTH, "0")
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        match status {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND | StatusCode::GONE => Err(DeliveryError::Gone(status.as_u16())),
            _ => {
                warn!(status = status.as_u16(), "Push service rejected message");
                Err(DeliveryError::Rejected(status.as_u16()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_audience() {
        assert_eq!(
            endpoint_audience("https://fcm.googleapis.com/fcm/send/abc").unwrap(),
            "https://fcm.googleapis.com"
        );
        assert_eq!(
            endpoint_audience("https://push.example.com:8443/x").unwrap(),
            "https://push.example.com:8443"
        );
        assert!(endpoint_audience("not a url").is_err());
        assert!(endpoint_audience("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_from_config_requires_both_keys() {
        let mut config = flock_common::AppConfig::with_defaults("postgres://x", "s").push;
        config.vapid_public_key = None;
        config.vapid_private_key = None;
        assert!(WebPushDelivery::from_config(&config).unwrap().is_none());

        let keys = VapidKeyPair::generate();
        config.vapid_public_key = Some(keys.public_key_base64());
        config.vapid_private_key = Some(keys.private_key_base64());
        let delivery = WebPushDelivery::from_config(&config).unwrap().unwrap();
        assert_eq!(delivery.public_key(), keys.public_key_base64());
    }
}
