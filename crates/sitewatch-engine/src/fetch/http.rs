//! Direct HTTP fetch

use super::AttemptFailure;
use sitewatch_core::errors::{ExError, ExErrorKind};
use sitewatch_core::Settings;

/// Shared client carrying the configured user agent and request timeout
///
/// # Errors
///
/// `ERR_INTERNAL` if the TLS backend cannot be initialised.
pub fn build_client(settings: &Settings) -> Result<reqwest::Client, ExError> {
    reqwest::Client::builder()
        .user_agent(settings.user_agent.clone())
        .timeout(settings.request_timeout())
        .build()
        .map_err(|e| {
            ExError::new(ExErrorKind::Internal)
                .with_op("build_http_client")
                .with_message(e.to_string())
        })
}

/// One GET attempt; only a 2xx response counts as success
pub async fn get(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, AttemptFailure> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AttemptFailure::Connection {
            cause: error_chain(&e),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(AttemptFailure::HttpStatus {
            code: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            url: url.to_string(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| AttemptFailure::Connection {
            cause: error_chain(&e),
        })?;
    Ok(body.to_vec())
}

/// Error message followed by its sources, `: `-separated
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}
