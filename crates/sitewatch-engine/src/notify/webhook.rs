//! Webhook delivery

use async_trait::async_trait;
use serde_json::Value;
use sitewatch_core::errors::{ExError, ExErrorKind};
use sitewatch_core_types::Sensitive;
use std::time::Duration;

/// Per-request timeout for webhook posts
pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts a JSON payload to one endpoint
#[async_trait]
pub trait WebhookSender: Send + Sync {
    async fn send(&self, endpoint: &Sensitive<String>, payload: &Value) -> Result<(), ExError>;
}

/// reqwest-backed sender; a non-2xx answer is a failed delivery
pub struct HttpWebhookSender {
    client: reqwest::Client,
}

impl HttpWebhookSender {
    /// # Errors
    ///
    /// `ERR_INTERNAL` if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, ExError> {
        let client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .map_err(|e| {
                ExError::new(ExErrorKind::Internal)
                    .with_op("build_webhook_client")
                    .with_message(e.to_string())
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookSender for HttpWebhookSender {
    async fn send(&self, endpoint: &Sensitive<String>, payload: &Value) -> Result<(), ExError> {
        let response = self
            .client
            .post(endpoint.expose().as_str())
            .json(payload)
            .send()
            .await
            .map_err(delivery_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExError::new(ExErrorKind::Delivery)
                .with_op("send_webhook")
                .with_message(format!("webhook answered {}", status)));
        }
        Ok(())
    }
}

/// Endpoint URLs carry tokens, so the URL is stripped from the message
fn delivery_error(err: reqwest::Error) -> ExError {
    let kind = if err.is_timeout() {
        ExErrorKind::Timeout
    } else {
        ExErrorKind::Delivery
    };
    ExError::new(kind)
        .with_op("send_webhook")
        .with_message(err.without_url().to_string())
}
