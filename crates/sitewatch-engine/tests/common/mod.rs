//! Shared fixtures for engine integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use serde_json::Value;
use sitewatch_core::errors::{ExError, ExErrorKind};
use sitewatch_core::Target;
use sitewatch_core_types::Sensitive;
use sitewatch_engine::fetch::{Fetch, FetchOutcome};
use sitewatch_engine::notify::{MailTransport, OutgoingEmail, WebhookSender};
use sitewatch_engine::Clock;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Minimal HTTP/1.1 server answering with scripted `(status, body)` pairs
///
/// The last response repeats once the script is exhausted. Returns the
/// base URL and a request counter.
pub async fn spawn_http_stub(script: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    tokio::spawn(async move {
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => return,
            };
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let (status, body) = script[n.min(script.len() - 1)];

            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(read) => buf.extend_from_slice(&chunk[..read]),
                }
            }

            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason(status),
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{}", addr), hits)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Address nothing listens on
pub async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", addr)
}

/// Fetcher returning scripted outcomes per canonical URL; the last one repeats
#[derive(Default)]
pub struct ScriptedFetch {
    scripts: Mutex<HashMap<String, VecDeque<FetchOutcome>>>,
}

impl ScriptedFetch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, url: &str, content: &[u8], is_error_state: bool) {
        self.scripts
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(FetchOutcome {
                content: content.to_vec(),
                is_error_state,
                attempts: 1,
            });
    }
}

#[async_trait]
impl Fetch for ScriptedFetch {
    async fn fetch(&self, target: &Target) -> FetchOutcome {
        let mut scripts = self.scripts.lock().unwrap();
        let queue = scripts
            .get_mut(target.canonical_url())
            .expect("no script for target");
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap()
        }
    }
}

/// Clock advancing one second per reading
pub struct SteppingClock {
    next: Mutex<DateTime<Utc>>,
}

impl SteppingClock {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            next: Mutex::new(start),
        }
    }
}

impl Default for SteppingClock {
    fn default() -> Self {
        Self::starting_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let mut next = self.next.lock().unwrap();
        let now = *next;
        *next = now + ChronoDuration::seconds(1);
        now
    }
}

/// Webhook sender recording payloads; endpoints containing `fail` are refused
#[derive(Default)]
pub struct RecordingWebhook {
    pub sent: Mutex<Vec<(String, Value)>>,
}

#[async_trait]
impl WebhookSender for RecordingWebhook {
    async fn send(&self, endpoint: &Sensitive<String>, payload: &Value) -> Result<(), ExError> {
        if endpoint.expose().contains("fail") {
            return Err(ExError::new(ExErrorKind::Delivery).with_message("refused"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((endpoint.expose().clone(), payload.clone()));
        Ok(())
    }
}

/// Mail transport recording messages; recipients starting with `bounce` fail
#[derive(Default)]
pub struct RecordingMail {
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

#[async_trait]
impl MailTransport for RecordingMail {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), ExError> {
        if email.to.starts_with("bounce") {
            return Err(ExError::new(ExErrorKind::Delivery).with_message("mailbox unavailable"));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}
