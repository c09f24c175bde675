//! Fan-out of one notification to every configured channel

use super::composer::Notification;
use super::email::{MailTransport, OutgoingEmail};
use super::recipients::Recipients;
use super::webhook::WebhookSender;
use sitewatch_core::errors::{ExError, ExErrorKind};
use sitewatch_core::{log_op_end, log_op_start, NotifyConfig};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Where a delivery went
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    /// Position in `webhook_urls`; the URL itself is secret
    Webhook { index: usize },
    Email { recipient: String },
}

#[derive(Debug, Clone)]
pub struct Delivery {
    pub channel: Channel,
    pub result: Result<(), ExError>,
}

/// Per-channel results of one dispatch
#[derive(Debug, Clone, Default)]
pub struct DeliveryReport {
    pub deliveries: Vec<Delivery>,
}

impl DeliveryReport {
    pub fn succeeded(&self) -> usize {
        self.deliveries.iter().filter(|d| d.result.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Channel, &ExError)> {
        self.deliveries
            .iter()
            .filter_map(|d| d.result.as_ref().err().map(|e| (&d.channel, e)))
    }

    fn record(&mut self, channel: Channel, result: Result<(), ExError>) {
        if let Err(err) = &result {
            tracing::warn!(channel = ?channel, error = %err, "notification delivery failed");
        }
        self.deliveries.push(Delivery { channel, result });
    }
}

/// Sends notifications through the webhook and mail capabilities
pub struct NotificationDispatcher {
    webhook: Arc<dyn WebhookSender>,
    mail: Arc<dyn MailTransport>,
    email_delay: Duration,
}

impl NotificationDispatcher {
    pub fn new(
        webhook: Arc<dyn WebhookSender>,
        mail: Arc<dyn MailTransport>,
        email_delay: Duration,
    ) -> Self {
        Self {
            webhook,
            mail,
            email_delay,
        }
    }

    /// Deliver to every webhook, then to every recipient in turn
    ///
    /// Each recipient gets a separate message addressed only to them.
    /// Messages are sent one at a time with `email_delay` between them.
    pub async fn dispatch(&self, notification: &Notification, notify: &NotifyConfig) -> DeliveryReport {
        let start = Instant::now();
        let recipients = Recipients::from_config(&notify.recipients);
        log_op_start!(
            "dispatch_notification",
            webhook_count = notify.webhook_urls.len(),
            recipient_count = recipients.len()
        );

        let mut report = DeliveryReport::default();

        for (index, endpoint) in notify.webhook_urls.iter().enumerate() {
            let result = self
                .webhook
                .send(endpoint, &notification.webhook_payload)
                .await
                .map_err(|e| {
                    e.with_entity_id(format!("webhook[{}] {}", index, endpoint.host_hint()))
                });
            report.record(Channel::Webhook { index }, result);
        }

        for (position, recipient) in recipients.iter().enumerate() {
            if position > 0 {
                tokio::time::sleep(self.email_delay).await;
            }
            let result = match &notify.mail_from {
                Some(from) => {
                    let email = OutgoingEmail {
                        from: from.clone(),
                        to: recipient.to_string(),
                        subject: notification.subject.clone(),
                        text_body: notification.text_body.clone(),
                        html_body: notification.html_body.clone(),
                    };
                    self.mail.send(&email).await
                }
                None => Err(ExError::new(ExErrorKind::Delivery)
                    .with_op("send_email")
                    .with_entity_id(recipient)
                    .with_message("notify.mail_from is not configured")),
            };
            report.record(
                Channel::Email {
                    recipient: recipient.to_string(),
                },
                result,
            );
        }

        log_op_end!(
            "dispatch_notification",
            duration_ms = start.elapsed().as_millis() as u64,
            delivered = report.succeeded(),
            failed = report.failures().count()
        );
        report
    }
}
