//! History entry naming
//!
//! Entries are directories named after the capture time. Names must sort
//! strictly after every existing entry so that "most recent prior" is just
//! the previous name in a sorted listing.

use chrono::{DateTime, Utc};

/// Capture-time format of an entry name
pub const ENTRY_NAME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Length of a name produced by [`ENTRY_NAME_FORMAT`]
const STEM_LEN: usize = 15;

/// Highest collision counter that still sorts correctly with three digits
const MAX_COUNTER: u32 = 999;

/// Pick the name for a new entry
///
/// `existing` must be sorted ascending. Returns `None` when the collision
/// counter is exhausted for the newest stem.
pub fn next_entry_name(existing: &[String], captured_at: DateTime<Utc>) -> Option<String> {
    let candidate = captured_at.format(ENTRY_NAME_FORMAT).to_string();
    let newest = match existing.last() {
        Some(newest) if candidate.as_str() <= newest.as_str() => newest,
        _ => return Some(candidate),
    };

    let (stem, counter) = split_counter(newest);
    let next = counter + 1;
    (next <= MAX_COUNTER).then(|| format!("{}_{:03}", stem, next))
}

/// `20240101_000000_004` → (`20240101_000000`, 4); anything else → (name, 0)
fn split_counter(name: &str) -> (&str, u32) {
    if name.len() == STEM_LEN + 4 && name.as_bytes()[STEM_LEN] == b'_' {
        if let Ok(counter) = name[STEM_LEN + 1..].parse::<u32>() {
            return (&name[..STEM_LEN], counter);
        }
    }
    (name, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, h, m, s).unwrap()
    }

    #[test]
    fn test_first_entry_uses_timestamp() {
        assert_eq!(
            next_entry_name(&[], at(9, 5, 7)),
            Some("20240301_090507".to_string())
        );
    }

    #[test]
    fn test_later_timestamp_is_used_verbatim() {
        let existing = vec!["20240301_090507".to_string()];
        assert_eq!(
            next_entry_name(&existing, at(9, 5, 8)),
            Some("20240301_090508".to_string())
        );
    }

    #[test]
    fn test_same_second_gets_counter() {
        let existing = vec!["20240301_090507".to_string()];
        assert_eq!(
            next_entry_name(&existing, at(9, 5, 7)),
            Some("20240301_090507_001".to_string())
        );

        let existing = vec![
            "20240301_090507".to_string(),
            "20240301_090507_001".to_string(),
        ];
        assert_eq!(
            next_entry_name(&existing, at(9, 5, 7)),
            Some("20240301_090507_002".to_string())
        );
    }

    #[test]
    fn test_clock_going_backwards_still_sorts_last() {
        let existing = vec!["20240301_100000".to_string()];
        let name = next_entry_name(&existing, at(9, 0, 0)).unwrap();
        assert!(name.as_str() > existing[0].as_str());
    }

    #[test]
    fn test_counter_exhaustion() {
        let existing = vec!["20240301_090507_999".to_string()];
        assert_eq!(next_entry_name(&existing, at(9, 5, 7)), None);
    }

    #[test]
    fn test_counted_name_sorts_before_next_second() {
        assert!("20240301_090507_001" < "20240301_090508");
    }
}
