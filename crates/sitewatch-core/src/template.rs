//! Webhook payload templates
//!
//! A template is a JSON document whose string values may contain the
//! placeholders `{timestamp}` and `{changes_summary}`. It is validated when
//! the configuration is loaded. Rendering substitutes inside string values
//! of the parsed document, so the substituted text is escaped by the JSON
//! serializer rather than spliced into raw JSON.

use crate::errors::{Result, WatchError};
use serde::Deserialize;
use serde_json::Value;

pub const PLACEHOLDER_TIMESTAMP: &str = "{timestamp}";
pub const PLACEHOLDER_SUMMARY: &str = "{changes_summary}";

const KNOWN_PLACEHOLDERS: [&str; 2] = ["timestamp", "changes_summary"];

/// A validated webhook payload template
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct WebhookTemplate {
    document: Value,
}

impl WebhookTemplate {
    /// Parse and validate a template
    ///
    /// # Errors
    ///
    /// `WatchError::InvalidTemplate` if the text is not JSON or a string
    /// value references a placeholder outside the fixed set.
    pub fn parse(text: &str) -> Result<Self> {
        let document: Value =
            serde_json::from_str(text).map_err(|e| WatchError::InvalidTemplate {
                reason: format!("template is not valid JSON: {}", e),
            })?;
        check_placeholders(&document)?;
        Ok(Self { document })
    }

    /// Produce the payload for one notification
    pub fn render(&self, timestamp: &str, summary: &str) -> Value {
        let mut payload = self.document.clone();
        substitute(&mut payload, timestamp, summary);
        payload
    }
}

impl TryFrom<String> for WebhookTemplate {
    type Error = WatchError;

    fn try_from(text: String) -> Result<Self> {
        Self::parse(&text)
    }
}

fn substitute(value: &mut Value, timestamp: &str, summary: &str) {
    match value {
        Value::String(s) => {
            if s.contains('{') {
                *s = s
                    .replace(PLACEHOLDER_TIMESTAMP, timestamp)
                    .replace(PLACEHOLDER_SUMMARY, summary);
            }
        }
        Value::Array(items) => items
            .iter_mut()
            .for_each(|item| substitute(item, timestamp, summary)),
        Value::Object(map) => map
            .values_mut()
            .for_each(|item| substitute(item, timestamp, summary)),
        _ => {}
    }
}

fn check_placeholders(value: &Value) -> Result<()> {
    match value {
        Value::String(s) => {
            for name in placeholder_names(s) {
                if !KNOWN_PLACEHOLDERS.contains(&name) {
                    return Err(WatchError::InvalidTemplate {
                        reason: format!(
                            "unknown placeholder {{{}}}; allowed: {{timestamp}}, {{changes_summary}}",
                            name
                        ),
                    });
                }
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(check_placeholders),
        Value::Object(map) => map.values().try_for_each(check_placeholders),
        _ => Ok(()),
    }
}

/// Names inside `{...}` where the name is a plain identifier
fn placeholder_names(s: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = s;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                {
                    names.push(name);
                }
                rest = &after[close + 1..];
            }
            None => break,
        }
    }
    names
}
