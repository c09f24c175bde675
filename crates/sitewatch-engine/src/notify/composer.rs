//! Builds the notification for a run's changes

use crate::detect::ChangeRecord;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sitewatch_core::{NotifyConfig, WebhookTemplate};

pub const ALERT_TITLE: &str = "Website change alert";

/// Format of timestamps shown to people
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One composed notification, ready for every channel
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub timestamp: String,
    /// One block per change, blocks separated by a blank line
    pub summary: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
    pub webhook_payload: Value,
}

/// Composes notifications; holds the optional webhook template
#[derive(Debug, Clone, Default)]
pub struct NotificationComposer {
    template: Option<WebhookTemplate>,
}

impl NotificationComposer {
    pub fn new(notify: &NotifyConfig) -> Self {
        Self {
            template: notify.webhook_template.clone(),
        }
    }

    pub fn with_template(template: Option<WebhookTemplate>) -> Self {
        Self { template }
    }

    /// `None` when there is nothing to report
    pub fn compose(&self, changes: &[ChangeRecord], run_at: DateTime<Utc>) -> Option<Notification> {
        if changes.is_empty() {
            return None;
        }

        let timestamp = run_at.format(DISPLAY_TIME_FORMAT).to_string();
        let summary = changes
            .iter()
            .map(change_block)
            .collect::<Vec<_>>()
            .join("\n\n");
        let subject = format!("{} ({})", ALERT_TITLE, timestamp);

        let webhook_payload = match &self.template {
            Some(template) => template.render(&timestamp, &summary),
            None => json!({
                "msgtype": "text",
                "text": { "content": format!("{}\n\n{}", subject, summary) }
            }),
        };

        Some(Notification {
            html_body: html_body(&subject, &summary),
            text_body: summary.clone(),
            timestamp,
            summary,
            subject,
            webhook_payload,
        })
    }
}

fn change_block(record: &ChangeRecord) -> String {
    let mut lines = vec![
        format!("Target: {}", record.label),
        format!("URL: {}", record.canonical_url),
        format!(
            "Changed at: {} UTC",
            record.captured_at.format(DISPLAY_TIME_FORMAT)
        ),
        format!("Snapshot: {}", record.display_url),
    ];
    if record.is_error_state {
        lines.push("Status: error state".to_string());
    }
    lines.push("Diff:".to_string());
    lines.push(record.diff.text.clone());
    lines.join("\n")
}

fn html_body(subject: &str, summary: &str) -> String {
    format!(
        "<html><body>\n<h3>{}</h3>\n<p>{}</p>\n</body></html>",
        html_escape(subject),
        html_escape(summary).replace('\n', "<br>\n")
    )
}

pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
