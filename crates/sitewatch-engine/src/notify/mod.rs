//! Notification composition and delivery
//!
//! A run's changes become one [`Notification`]: a text summary, a webhook
//! payload and the subject and bodies of an email. Dispatch fans it out to
//! every webhook endpoint and, one message per recipient, to every email
//! recipient. Delivery failures are collected, never propagated.

pub mod composer;
pub mod dispatch;
pub mod email;
pub mod recipients;
pub mod smtp;
pub mod webhook;

pub use composer::{Notification, NotificationComposer};
pub use dispatch::{Channel, Delivery, DeliveryReport, NotificationDispatcher};
pub use email::{mail_transport, MailTransport, OutboxMailTransport, OutgoingEmail};
pub use recipients::Recipients;
pub use smtp::SmtpMailTransport;
pub use webhook::{HttpWebhookSender, WebhookSender};
