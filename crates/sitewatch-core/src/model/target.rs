//! Watched target model
//!
//! A target is either fetched directly over HTTP or produced by a shell
//! command. Either way it is keyed on a canonical URL, which for command
//! targets is lifted out of the command text.

use crate::config::TargetSpec;
use crate::errors::{Result, WatchError};
use crate::state_key::key_for;

const URL_SCHEMES: [&str; 2] = ["https://", "http://"];

/// How the content of a target is acquired
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
    /// Plain HTTP GET of the URL
    DirectFetch { url: String },
    /// `sh -c <command>`, stdout is the content
    CommandFetch { command: String },
}

/// A resolved target: has a canonical URL and therefore a state key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: Option<String>,
    pub kind: TargetKind,
    canonical_url: String,
}

impl Target {
    /// Build a direct-fetch target
    pub fn direct(name: Option<String>, url: impl Into<String>) -> Result<Self> {
        let url = url.into().trim().to_string();
        let label = name.clone().unwrap_or_else(|| url.clone());
        if url.is_empty() {
            return Err(WatchError::UnresolvableTarget {
                target: label,
                reason: "url target has an empty value".to_string(),
            });
        }
        if !URL_SCHEMES.iter().any(|s| url.starts_with(s)) {
            return Err(WatchError::UnresolvableTarget {
                target: label,
                reason: format!("'{}' is not an http(s) URL", url),
            });
        }
        Ok(Self {
            name,
            kind: TargetKind::DirectFetch { url: url.clone() },
            canonical_url: url,
        })
    }

    /// Build a command-fetch target; the canonical URL is extracted from the command
    pub fn command(name: Option<String>, command: impl Into<String>) -> Result<Self> {
        let command = command.into().trim().to_string();
        let label = name.clone().unwrap_or_else(|| command.clone());
        if command.is_empty() {
            return Err(WatchError::UnresolvableTarget {
                target: label,
                reason: "command target has an empty command".to_string(),
            });
        }
        let canonical_url =
            extract_url(&command).ok_or_else(|| WatchError::UnresolvableTarget {
                target: label,
                reason: "command does not contain an http(s) URL".to_string(),
            })?;
        Ok(Self {
            name,
            kind: TargetKind::CommandFetch { command },
            canonical_url,
        })
    }

    /// Resolve a configuration entry into a target
    ///
    /// # Errors
    ///
    /// `WatchError::UnresolvableTarget` when the entry lacks its source
    /// field or no canonical URL can be derived.
    pub fn resolve(spec: &TargetSpec) -> Result<Self> {
        match spec {
            TargetSpec::Url { name, value } => match value {
                Some(value) => Self::direct(name.clone(), value.as_str()),
                None => Err(WatchError::UnresolvableTarget {
                    target: name.clone().unwrap_or_else(|| "<unnamed>".to_string()),
                    reason: "url target is missing `value`".to_string(),
                }),
            },
            TargetSpec::Command { name, command } => match command {
                Some(command) => Self::command(name.clone(), command.as_str()),
                None => Err(WatchError::UnresolvableTarget {
                    target: name.clone().unwrap_or_else(|| "<unnamed>".to_string()),
                    reason: "command target is missing `command`".to_string(),
                }),
            },
        }
    }

    /// The dereferenced URL this target is keyed on
    pub fn canonical_url(&self) -> &str {
        &self.canonical_url
    }

    /// Filesystem-safe state key derived from the canonical URL
    pub fn state_key(&self) -> String {
        key_for(&self.canonical_url)
    }

    /// Human-facing label: the configured name, else the canonical URL
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.canonical_url)
    }
}

/// Find the first http(s) URL token in free text
///
/// The token ends at whitespace or a quote character.
pub fn extract_url(text: &str) -> Option<String> {
    let start = URL_SCHEMES
        .iter()
        .filter_map(|scheme| text.find(scheme))
        .min()?;
    let token: String = text[start..]
        .chars()
        .take_while(|c| !c.is_whitespace() && !matches!(c, '"' | '\'' | '`'))
        .collect();
    let has_host = URL_SCHEMES
        .iter()
        .any(|scheme| token.len() > scheme.len() && token.starts_with(scheme));
    has_host.then_some(token)
}
