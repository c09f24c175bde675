//! Why a single fetch attempt failed

use std::fmt;
use std::time::Duration;

/// Upper bound on the stderr text kept in error-state content, in chars
const STDERR_EXCERPT_CHARS: usize = 200;

/// Failure of one attempt
///
/// The rendered text only depends on the failure itself, never on time or
/// attempt number, so a persisting outage hashes the same on every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// Server answered with a non-2xx status
    HttpStatus { code: u16, reason: String, url: String },
    /// No usable response: DNS, connect, TLS, timeout or body read
    Connection { cause: String },
    /// Command exited unsuccessfully; `code` is `None` when killed by a signal.
    /// `stderr` holds a [`stderr_excerpt`], not the raw output.
    CommandExit { code: Option<i32>, stderr: String },
    CommandTimeout { timeout: Duration },
    CommandSpawn { cause: String },
}

impl AttemptFailure {
    /// Text stored as error-state content once retries are exhausted
    pub fn describe(&self, retry_count: u32) -> String {
        match self {
            AttemptFailure::Connection { cause } => {
                format!("connection failed after {} retries: {}", retry_count, cause)
            }
            other => other.to_string(),
        }
    }
}

/// Stable part of a failing command's stderr
///
/// Keeps the first non-empty line only, with every run of four or more
/// digits replaced by `N`, so elapsed times such as curl's "timed out after
/// 30001 milliseconds" do not make one outage hash differently per run.
pub fn stderr_excerpt(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    let line = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();

    let mut excerpt = String::with_capacity(line.len());
    let mut digits = String::new();
    for c in line.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        flush_digits(&mut excerpt, &mut digits);
        excerpt.push(c);
    }
    flush_digits(&mut excerpt, &mut digits);

    excerpt.chars().take(STDERR_EXCERPT_CHARS).collect()
}

fn flush_digits(out: &mut String, digits: &mut String) {
    if digits.len() >= 4 {
        out.push('N');
    } else {
        out.push_str(digits);
    }
    digits.clear();
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::HttpStatus { code, reason, url } => {
                write!(f, "HTTP Error: {} {} for url: {}", code, reason, url)
            }
            AttemptFailure::Connection { cause } => write!(f, "connection failed: {}", cause),
            AttemptFailure::CommandExit {
                code: Some(code),
                stderr,
            } => write!(f, "Command failed with exit code {}: {}", code, stderr),
            AttemptFailure::CommandExit { code: None, stderr } => {
                write!(f, "Command terminated by signal: {}", stderr)
            }
            AttemptFailure::CommandTimeout { timeout } => {
                write!(f, "Command timed out after {}s", timeout.as_secs_f64())
            }
            AttemptFailure::CommandSpawn { cause } => {
                write!(f, "Command could not be started: {}", cause)
            }
        }
    }
}
