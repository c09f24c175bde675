//! Email messages and the mail transport seam
//!
//! Every message is handed to a [`MailTransport`]. [`SmtpMailTransport`]
//! delivers through a relay; [`OutboxMailTransport`] renders RFC 5322
//! `multipart/alternative` documents as `.eml` files for an external
//! sender. [`mail_transport`] picks one from the configuration.

use super::smtp::SmtpMailTransport;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use sitewatch_core::errors::{ExError, ExErrorKind};
use sitewatch_core::MailBackend;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// Base64 line length for MIME bodies
const BASE64_LINE_LEN: usize = 76;

/// A message addressed to exactly one recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

impl OutgoingEmail {
    /// Render the full message with CRLF line endings
    ///
    /// Bodies are base64 encoded, so no line exceeds the RFC 5322 limit
    /// however long the diff lines are.
    pub fn to_mime(&self, message_id: &str, date: DateTime<Utc>) -> String {
        let boundary = format!("sitewatch-{}", message_id);
        let lines = [
            format!("From: {}", self.from),
            format!("To: {}", self.to),
            format!("Subject: {}", self.subject),
            format!("Date: {}", date.to_rfc2822()),
            format!("Message-ID: <{}@sitewatch>", message_id),
            "MIME-Version: 1.0".to_string(),
            format!(
                "Content-Type: multipart/alternative; boundary=\"{}\"",
                boundary
            ),
            String::new(),
            format!("--{}", boundary),
            "Content-Type: text/plain; charset=utf-8".to_string(),
            "Content-Transfer-Encoding: base64".to_string(),
            String::new(),
            base64_body(&self.text_body),
            format!("--{}", boundary),
            "Content-Type: text/html; charset=utf-8".to_string(),
            "Content-Transfer-Encoding: base64".to_string(),
            String::new(),
            base64_body(&self.html_body),
            format!("--{}--", boundary),
            String::new(),
        ];
        lines.join("\n").replace("\r\n", "\n").replace('\n', "\r\n")
    }
}

fn base64_body(text: &str) -> String {
    STANDARD
        .encode(text.as_bytes())
        .as_bytes()
        .chunks(BASE64_LINE_LEN)
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Hands a message over for delivery
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), ExError>;
}

/// Writes each message as an `.eml` file into a directory
#[derive(Debug, Clone)]
pub struct OutboxMailTransport {
    dir: PathBuf,
}

impl OutboxMailTransport {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl MailTransport for OutboxMailTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), ExError> {
        let now = Utc::now();
        let message_id = Uuid::new_v4().to_string();
        let file_name = format!("{}_{}.eml", now.format("%Y%m%d_%H%M%S"), message_id);
        let temp_path = self.dir.join(format!(".{}.tmp", file_name));
        let path = self.dir.join(file_name);

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| outbox_error(&email.to, e))?;
        tokio::fs::write(&temp_path, email.to_mime(&message_id, now))
            .await
            .map_err(|e| outbox_error(&email.to, e))?;
        // Relays only pick up complete files
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|e| outbox_error(&email.to, e))?;

        tracing::debug!(recipient = %email.to, path = %path.display(), "email queued");
        Ok(())
    }
}

/// Build the transport for the configured backend
///
/// # Errors
///
/// `ERR_INVALID_CONFIG` when the SMTP relay settings cannot be used.
pub fn mail_transport(backend: &MailBackend) -> Result<Arc<dyn MailTransport>, ExError> {
    Ok(match backend {
        MailBackend::Smtp(settings) => Arc::new(SmtpMailTransport::new(settings)?),
        MailBackend::Outbox(dir) => Arc::new(OutboxMailTransport::new(dir.clone())),
    })
}

fn outbox_error(recipient: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Delivery)
        .with_op("queue_email")
        .with_entity_id(recipient.to_string())
        .with_message(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn email() -> OutgoingEmail {
        OutgoingEmail {
            from: "watch@example.com".to_string(),
            to: "ops@example.com".to_string(),
            subject: "Website change alert (2024-01-01 00:00:00)".to_string(),
            text_body: "URL: https://example.com/\nDiff:".to_string(),
            html_body: "URL: https://example.com/<br>\nDiff:".to_string(),
        }
    }

    #[test]
    fn test_mime_has_both_parts_and_crlf() {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mime = email().to_mime("abc", date);

        assert!(mime.contains("To: ops@example.com\r\n"));
        assert!(mime.contains("boundary=\"sitewatch-abc\""));
        assert!(mime.contains("Content-Type: text/plain; charset=utf-8"));
        assert!(mime.contains("Content-Type: text/html; charset=utf-8"));
        let text_b64 = STANDARD.encode("URL: https://example.com/\nDiff:");
        assert!(mime.contains(&format!("\r\n{}\r\n", text_b64)));
        assert!(mime.ends_with("--sitewatch-abc--\r\n"));
        assert!(!mime.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn test_long_diff_lines_stay_within_line_limit() {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let long_line = format!("+<div>{}</div>", "x".repeat(5000));
        let message = OutgoingEmail {
            text_body: format!("Diff:\n{}", long_line),
            html_body: format!("Diff:<br>\n{}", long_line),
            ..email()
        };

        let mime = message.to_mime("abc", date);

        assert!(mime.split("\r\n").all(|line| line.len() <= 998));
        let text_part: String = mime
            .split("\r\n")
            .skip_while(|line| *line != "Content-Type: text/plain; charset=utf-8")
            .skip(3)
            .take_while(|line| !line.starts_with("--"))
            .collect();
        let decoded = STANDARD.decode(text_part).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), message.text_body);
    }

    #[tokio::test]
    async fn test_outbox_backend_queues_into_its_directory() {
        let dir = TempDir::new().unwrap();
        let transport = mail_transport(&MailBackend::Outbox(dir.path().join("queued"))).unwrap();

        transport.send(&email()).await.unwrap();

        assert_eq!(std::fs::read_dir(dir.path().join("queued")).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_outbox_writes_one_file_per_message() {
        let dir = TempDir::new().unwrap();
        let transport = OutboxMailTransport::new(dir.path().join("outbox"));

        transport.send(&email()).await.unwrap();
        transport.send(&email()).await.unwrap();

        let files: Vec<_> = std::fs::read_dir(dir.path().join("outbox"))
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.ends_with(".eml")));
    }
}
