//! SMTP delivery through a relay over implicit TLS

use super::email::{MailTransport, OutgoingEmail};
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use sitewatch_core::errors::{ExError, ExErrorKind};
use sitewatch_core::SmtpSettings;
use std::time::Duration;

pub const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends each message as its own SMTP transaction
pub struct SmtpMailTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    /// Prepare the relay; no connection is made until the first send
    ///
    /// # Errors
    ///
    /// `ERR_INVALID_CONFIG` when TLS parameters cannot be built for the host.
    pub fn new(settings: &SmtpSettings) -> Result<Self, ExError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            .map_err(|e| {
                ExError::new(ExErrorKind::InvalidConfig)
                    .with_op("build_smtp_transport")
                    .with_entity_id(settings.host.clone())
                    .with_message(e.to_string())
            })?
            .port(settings.port)
            .timeout(Some(SMTP_TIMEOUT));
        if let (Some(user), Some(password)) = (&settings.user, &settings.password) {
            builder = builder.credentials(Credentials::new(
                user.clone(),
                password.expose().clone(),
            ));
        }
        Ok(Self {
            mailer: builder.build(),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), ExError> {
        let message = to_message(email)?;
        self.mailer
            .send(message)
            .await
            .map_err(|e| delivery_error(&email.to, e.to_string()))?;
        tracing::debug!(recipient = %email.to, "email sent");
        Ok(())
    }
}

/// Single-recipient `multipart/alternative` message
fn to_message(email: &OutgoingEmail) -> Result<Message, ExError> {
    let from: Mailbox = email
        .from
        .parse()
        .map_err(|e| delivery_error(&email.to, format!("invalid sender address: {}", e)))?;
    let to: Mailbox = email
        .to
        .parse()
        .map_err(|e| delivery_error(&email.to, format!("invalid recipient address: {}", e)))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(email.subject.clone())
        .multipart(MultiPart::alternative_plain_html(
            email.text_body.clone(),
            email.html_body.clone(),
        ))
        .map_err(|e| delivery_error(&email.to, e.to_string()))
}

fn delivery_error(recipient: &str, message: String) -> ExError {
    ExError::new(ExErrorKind::Delivery)
        .with_op("send_email")
        .with_entity_id(recipient.to_string())
        .with_message(message)
}
