//! Notification composition and fan-out

mod common;

use chrono::{TimeZone, Utc};
use common::{RecordingMail, RecordingWebhook};
use sitewatch_core::config::RecipientList;
use sitewatch_core::diff::DisplayDiff;
use sitewatch_core::NotifyConfig;
use sitewatch_core_types::Sensitive;
use sitewatch_engine::notify::{Channel, NotificationComposer, NotificationDispatcher};
use sitewatch_engine::ChangeRecord;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn change() -> ChangeRecord {
    ChangeRecord {
        label: "Docs".to_string(),
        canonical_url: "https://example.com/docs".to_string(),
        state_key: "example.com_docs".to_string(),
        entry: "20240101_000000".to_string(),
        snapshot_path: PathBuf::from("snapshots/example.com_docs/20240101_000000/snapshot.html"),
        display_url: "snapshots/example.com_docs/20240101_000000/snapshot.html".to_string(),
        captured_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        content_hash: "h".to_string(),
        is_error_state: false,
        diff: DisplayDiff {
            text: "+new line".to_string(),
            truncated: false,
        },
    }
}

fn notify_config(recipients: &str, webhooks: &[&str]) -> NotifyConfig {
    NotifyConfig {
        webhook_urls: webhooks
            .iter()
            .map(|w| Sensitive::new(w.to_string()))
            .collect(),
        recipients: RecipientList::Joined(recipients.to_string()),
        mail_from: Some("watch@example.com".to_string()),
        ..NotifyConfig::default()
    }
}

fn dispatcher(
    webhook: &Arc<RecordingWebhook>,
    mail: &Arc<RecordingMail>,
) -> NotificationDispatcher {
    NotificationDispatcher::new(webhook.clone(), mail.clone(), Duration::from_millis(1))
}

#[tokio::test]
async fn test_each_recipient_gets_a_private_message() {
    let webhook = Arc::new(RecordingWebhook::default());
    let mail = Arc::new(RecordingMail::default());
    let config = notify_config("a@example.com, b@example.com,a@example.com, c@example.com", &[]);
    let notification = NotificationComposer::new(&config)
        .compose(&[change()], Utc::now())
        .unwrap();

    let report = dispatcher(&webhook, &mail).dispatch(&notification, &config).await;

    let sent = mail.sent.lock().unwrap();
    let to: Vec<&str> = sent.iter().map(|e| e.to.as_str()).collect();
    assert_eq!(to, vec!["a@example.com", "b@example.com", "c@example.com"]);
    assert!(sent.iter().all(|e| !e.to.contains(',')));
    assert!(sent.iter().all(|e| e.subject == notification.subject));
    assert_eq!(report.succeeded(), 3);

    for email in sent.iter() {
        let mime = email.to_mime("id", Utc::now());
        let headers = mime.split("\r\n\r\n").next().unwrap();
        for other in to.iter().filter(|addr| **addr != email.to) {
            assert!(!headers.contains(other), "{} leaked into {}", other, email.to);
        }
        assert!(headers.contains(&format!("To: {}", email.to)));
    }
}

#[tokio::test]
async fn test_failed_deliveries_do_not_stop_others() {
    let webhook = Arc::new(RecordingWebhook::default());
    let mail = Arc::new(RecordingMail::default());
    let config = notify_config(
        "bounce@example.com, ok@example.com",
        &["https://hooks.example/fail", "https://hooks.example/ok"],
    );
    let notification = NotificationComposer::new(&config)
        .compose(&[change()], Utc::now())
        .unwrap();

    let report = dispatcher(&webhook, &mail).dispatch(&notification, &config).await;

    assert_eq!(report.succeeded(), 2);
    let failed: Vec<&Channel> = report.failures().map(|(channel, _)| channel).collect();
    assert_eq!(
        failed,
        vec![
            &Channel::Webhook { index: 0 },
            &Channel::Email {
                recipient: "bounce@example.com".to_string()
            }
        ]
    );
    assert_eq!(webhook.sent.lock().unwrap().len(), 1);
    assert_eq!(mail.sent.lock().unwrap()[0].to, "ok@example.com");
}

#[tokio::test]
async fn test_webhook_receives_composed_payload() {
    let webhook = Arc::new(RecordingWebhook::default());
    let mail = Arc::new(RecordingMail::default());
    let config = notify_config("", &["https://hooks.example/ok"]);
    let run_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 5, 0).unwrap();
    let notification = NotificationComposer::new(&config)
        .compose(&[change()], run_at)
        .unwrap();

    dispatcher(&webhook, &mail).dispatch(&notification, &config).await;

    let sent = webhook.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, notification.webhook_payload);
    assert!(mail.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_sender_fails_each_recipient() {
    let webhook = Arc::new(RecordingWebhook::default());
    let mail = Arc::new(RecordingMail::default());
    let config = NotifyConfig {
        mail_from: None,
        ..notify_config("a@example.com, b@example.com", &[])
    };
    let notification = NotificationComposer::new(&config)
        .compose(&[change()], Utc::now())
        .unwrap();

    let report = dispatcher(&webhook, &mail).dispatch(&notification, &config).await;

    assert_eq!(report.failures().count(), 2);
    assert!(mail.sent.lock().unwrap().is_empty());
}
