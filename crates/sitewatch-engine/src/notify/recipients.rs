//! Email recipient list normalisation

use sitewatch_core::config::RecipientList;

/// Trimmed, non-empty, de-duplicated addresses in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipients(Vec<String>);

impl Recipients {
    /// Split every entry on commas, trim, drop empties and exact duplicates
    ///
    /// Addresses containing control characters are dropped as well; they
    /// would break the message headers.
    pub fn parse<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut addresses: Vec<String> = Vec::new();
        for entry in entries {
            for address in entry.as_ref().split(',').map(str::trim) {
                if address.is_empty() || address.chars().any(char::is_control) {
                    continue;
                }
                if !addresses.iter().any(|a| a == address) {
                    addresses.push(address.to_string());
                }
            }
        }
        Self(addresses)
    }

    pub fn from_config(list: &RecipientList) -> Self {
        Self::parse(list.entries())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_deduplicates_in_order() {
        let recipients = Recipients::parse([" b@example.com, a@example.com ,,b@example.com"]);
        assert_eq!(
            recipients.iter().collect::<Vec<_>>(),
            vec!["b@example.com", "a@example.com"]
        );
    }

    #[test]
    fn test_duplicates_are_exact_matches_only() {
        let recipients = Recipients::parse(["A@example.com", "a@example.com"]);
        assert_eq!(recipients.len(), 2);
    }

    #[test]
    fn test_header_breaking_address_is_dropped() {
        let recipients = Recipients::parse(["ok@example.com", "evil@example.com\nBcc: x@y"]);
        assert_eq!(recipients.iter().collect::<Vec<_>>(), vec!["ok@example.com"]);
    }

    #[test]
    fn test_blank_list_is_empty() {
        assert!(Recipients::parse(["  ", ","]).is_empty());
        assert!(Recipients::from_config(&RecipientList::default()).is_empty());
    }
}
