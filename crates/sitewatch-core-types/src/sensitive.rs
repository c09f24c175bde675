//! Redaction wrapper for secrets in configuration
//!
//! Webhook URLs carry their access token in the path or query, so they are
//! held as `Sensitive<String>`. Formatting never shows the value; code that
//! really needs it calls [`Sensitive::expose`].

use serde::{Deserialize, Deserializer};
use std::fmt;

const REDACTED: &str = "***REDACTED***";

/// A value that must not appear in logs or error messages
///
/// ```
/// use sitewatch_core_types::Sensitive;
///
/// let hook = Sensitive::new("https://hooks.example/T000/secret".to_string());
/// assert_eq!(format!("{:?}", hook), "***REDACTED***");
/// assert_eq!(hook.host_hint(), "https://hooks.example/***");
/// ```
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Borrow the secret, e.g. to issue the request
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl Sensitive<String> {
    /// Scheme and host only, safe to log
    pub fn host_hint(&self) -> String {
        let (scheme, rest) = match self.0.split_once("://") {
            Some(parts) => parts,
            None => return REDACTED.to_string(),
        };
        let host = rest
            .split(|c| c == '/' || c == '?' || c == '#')
            .next()
            .unwrap_or_default();
        // Credentials in the authority are secret too
        let host = host.rsplit('@').next().unwrap_or_default();
        format!("{}://{}/***", scheme, host)
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Sensitive<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Sensitive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatting_never_shows_value() {
        let secret = Sensitive::new("https://hooks.example/token-123".to_string());
        assert_eq!(format!("{:?}", secret), REDACTED);
        assert_eq!(secret.to_string(), REDACTED);
    }

    #[test]
    fn test_host_hint_drops_path_query_and_credentials() {
        let hook = Sensitive::new("https://user:pw@hooks.example:8443/a/b?key=1".to_string());
        assert_eq!(hook.host_hint(), "https://hooks.example:8443/***");

        let bare = Sensitive::new("not a url".to_string());
        assert_eq!(bare.host_hint(), REDACTED);
    }

    #[test]
    fn test_deserializes_transparently() {
        let secret: Sensitive<String> = serde_json::from_str("\"https://x/y\"").unwrap();
        assert_eq!(secret.expose(), "https://x/y");
    }

    #[test]
    fn test_redacted_inside_derived_debug() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct Endpoint {
            label: String,
            url: Sensitive<String>,
        }

        let endpoint = Endpoint {
            label: "ops".to_string(),
            url: Sensitive::new("https://hooks.example/secret".to_string()),
        };

        let rendered = format!("{:?}", endpoint);
        assert!(rendered.contains("ops"));
        assert!(!rendered.contains("secret"));
    }
}
