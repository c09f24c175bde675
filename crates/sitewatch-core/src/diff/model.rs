//! Diff result model and display truncation

/// Text recorded when a target has no earlier snapshot to diff against
pub const NO_PRIOR_VERSION: &str = "no prior version to compare";

/// Shown in notifications when content hashes differ but lines do not
/// (e.g. only bytes that decode to the same replacement characters changed)
pub const NO_LINE_DIFFERENCES: &str = "(no line-level differences)";

/// Outcome of comparing a new snapshot with its predecessor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffReport {
    /// First observation of a target
    NoBaseline,
    /// Unified diff text, possibly empty
    Unified(String),
}

/// Diff text prepared for a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayDiff {
    pub text: String,
    pub truncated: bool,
}

impl DiffReport {
    /// Text persisted as `diff.txt`, never truncated
    pub fn full_text(&self) -> &str {
        match self {
            DiffReport::NoBaseline => NO_PRIOR_VERSION,
            DiffReport::Unified(text) => text,
        }
    }

    /// Notification rendering, cut after `max_lines` lines (0 = no limit)
    pub fn display(&self, max_lines: usize) -> DisplayDiff {
        let text = match self {
            DiffReport::NoBaseline => NO_PRIOR_VERSION,
            DiffReport::Unified(text) if text.is_empty() => NO_LINE_DIFFERENCES,
            DiffReport::Unified(text) => text,
        };
        truncate_lines(text, max_lines)
    }
}

/// Keep the first `max_lines` lines and append a marker naming how many were dropped
pub fn truncate_lines(text: &str, max_lines: usize) -> DisplayDiff {
    let total = text.lines().count();
    if max_lines == 0 || total <= max_lines {
        return DisplayDiff {
            text: text.to_string(),
            truncated: false,
        };
    }

    let mut kept: Vec<&str> = text.lines().take(max_lines).collect();
    let marker = format!("... (diff truncated, {} more lines)", total - max_lines);
    kept.push(&marker);
    DisplayDiff {
        text: kept.join("\n"),
        truncated: true,
    }
}
