//! Outbound SMS gateways

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, instrument};

/// Sends a text message to a phone number
#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send(&self, phone: &str, message: &str) -> Result<(), SmsError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    #[error("SMS gateway request failed: {0}")]
    Transport(String),

    #[error("SMS gateway rejected message (HTTP {0})")]
    Rejected(u16),
}

#[derive(Serialize)]
struct OutboundSms<'a> {
    to: &'a str,
    from: &'a str,
    body: &'a str,
}

/// Posts messages as JSON to an HTTP gateway with a bearer token
pub struct HttpSmsGateway {
    client: reqwest::Client,
    url: String,
    api_token: Option<String>,
    sender_name: String,
}

impl HttpSmsGateway {
    pub fn new(url: impl Into<String>, api_token: Option<String>, sender_name: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            url: url.into(),
            api_token,
            sender_name: sender_name.into(),
        }
    }
}

#[async_trait]
impl SmsGateway for HttpSmsGateway {
    #[instrument(skip(self, message))]
    async fn send(&self, phone: &str, message: &str) -> Result<(), SmsError> {
        let mut request = self.client.post(&self.url).json(&OutboundSms {
            to: phone,
            from: &self.sender_name,
            body: message,
        });
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SmsError::Transport(e.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(SmsError::Rejected(response.status().as_u16()))
        }
    }
}

/// Gateway used when none is configured: records the message in the log
#[derive(Debug, Default)]
pub struct LoggingSmsGateway;

#[async_trait]
impl SmsGateway for LoggingSmsGateway {
    async fn send(&self, phone: &str, message: &str) -> Result<(), SmsError> {
        info!(phone = %phone, chars = message.chars().count(), "SMS gateway not configured, message logged only");
        Ok(())
    }
}

/// Pick the gateway the configuration asks for
pub fn gateway_from_config(config: &flock_common::SmsConfig) -> std::sync::Arc<dyn SmsGateway> {
    match &config.gateway_url {
        Some(url) => std::sync::Arc::new(HttpSmsGateway::new(
            url.clone(),
            config.api_token.clone(),
            config.sender_name.clone(),
        )),
        None => std::sync::Arc::new(LoggingSmsGateway),
    }
}
