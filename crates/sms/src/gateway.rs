use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use sitestock_core::config::GatewayConfig;
use sitestock_core::domain::stakeholder::Address;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("gateway rejected the message: {0}")]
    Rejected(String),
    #[error("gateway request failed: {0}")]
    Request(String),
    #[error("delivery capability unavailable")]
    Unavailable,
}

#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send(&self, to: &Address, message: &str) -> Result<(), DeliveryError>;
}

/// Stand-in wired when no carrier credentials are configured. Every send
/// reports the capability as unavailable so the dispatcher can summarize
/// notification as skipped instead of failed.
#[derive(Default)]
pub struct DisabledGateway;

#[async_trait]
impl SmsGateway for DisabledGateway {
    async fn send(&self, _to: &Address, _message: &str) -> Result<(), DeliveryError> {
        Err(DeliveryError::Unavailable)
    }
}

/// Carrier messaging API client: form-encoded POST authenticated with an
/// `apiKey` header, one recipient per call.
pub struct HttpSmsGateway {
    http: reqwest::Client,
    endpoint: String,
    username: String,
    api_key: SecretString,
    sender_id: String,
}

impl HttpSmsGateway {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            username: config.username.clone(),
            api_key: config.api_key.clone(),
            sender_id: config.sender_id.clone(),
        })
    }
}

#[async_trait]
impl SmsGateway for HttpSmsGateway {
    async fn send(&self, to: &Address, message: &str) -> Result<(), DeliveryError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("apiKey", self.api_key.expose_secret())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("username", self.username.as_str()),
                ("to", to.0.as_str()),
                ("message", message),
                ("from", self.sender_id.as_str()),
            ])
            .send()
            .await
            .map_err(|error| DeliveryError::Request(error.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(DeliveryError::Rejected(format!("status {status}: {body}")))
        }
    }
}
