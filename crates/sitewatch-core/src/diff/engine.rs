//! Line-oriented unified diff.
//!
//! The entry point is [`unified_diff`], which decodes both sides permissively,
//! computes a shortest edit script (Myers) over lines and renders it in the
//! classic `---`/`+++`/`@@` unified format with three lines of context.

/// Lines of unchanged context around each change
pub const CONTEXT_LINES: usize = 3;

/// Edit-distance bound for the Myers search after trimming common prefix and
/// suffix. Beyond it the middle section is emitted as a full replacement,
/// which is still a correct diff but not a minimal one.
const MAX_EDIT_COST: usize = 2000;

/// One line-level edit operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOp<'a> {
    Equal(&'a str),
    Delete(&'a str),
    Insert(&'a str),
}

impl LineOp<'_> {
    fn is_change(&self) -> bool {
        !matches!(self, LineOp::Equal(_))
    }
}

/// Unified diff between two snapshot bodies
///
/// Invalid UTF-8 is replaced, never rejected. Identical texts (after
/// decoding) produce an empty string.
pub fn unified_diff(old: &[u8], new: &[u8]) -> String {
    let old_text = String::from_utf8_lossy(old);
    let new_text = String::from_utf8_lossy(new);
    unified_diff_text(&old_text, &new_text)
}

/// Unified diff over already-decoded text
pub fn unified_diff_text(old: &str, new: &str) -> String {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    let ops = diff_lines(&old_lines, &new_lines);
    render_unified(&ops, "old", "new")
}

/// Edit script turning `a` into `b`
pub fn diff_lines<'a>(a: &[&'a str], b: &[&'a str]) -> Vec<LineOp<'a>> {
    let prefix = a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let a_mid = &a[prefix..a.len() - suffix];
    let b_mid = &b[prefix..b.len() - suffix];

    let mut ops: Vec<LineOp<'a>> = a[..prefix].iter().map(|l| LineOp::Equal(*l)).collect();
    match myers(a_mid, b_mid) {
        Some(mid) => ops.extend(mid),
        None => {
            ops.extend(a_mid.iter().map(|l| LineOp::Delete(*l)));
            ops.extend(b_mid.iter().map(|l| LineOp::Insert(*l)));
        }
    }
    ops.extend(a[a.len() - suffix..].iter().map(|l| LineOp::Equal(*l)));
    ops
}

/// Greedy Myers shortest edit script; `None` when the cost bound is exceeded
fn myers<'a>(a: &[&'a str], b: &[&'a str]) -> Option<Vec<LineOp<'a>>> {
    let n = a.len() as isize;
    let m = b.len() as isize;
    let max = a.len() + b.len();
    if max == 0 {
        return Some(Vec::new());
    }

    let offset = max as isize;
    let mut v = vec![0isize; 2 * max + 2];
    // Round d reads only diagonals -d..=d of the previous round, so each
    // saved round holds just that window: 2d + 1 values.
    let mut trace: Vec<Vec<isize>> = Vec::new();

    'search: for d in 0..=max as isize {
        if d as usize > MAX_EDIT_COST {
            return None;
        }
        trace.push(v[(offset - d) as usize..=(offset + d) as usize].to_vec());
        let mut k = -d;
        while k <= d {
            let idx = (k + offset) as usize;
            let mut x = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) {
                v[idx + 1]
            } else {
                v[idx - 1] + 1
            };
            let mut y = x - k;
            while x < n && y < m && a[x as usize] == b[y as usize] {
                x += 1;
                y += 1;
            }
            v[idx] = x;
            if x >= n && y >= m {
                break 'search;
            }
            k += 2;
        }
    }

    let mut ops = Vec::with_capacity(max);
    let (mut x, mut y) = (n, m);
    for (d, window) in trace.iter().enumerate().rev() {
        let d = d as isize;
        if d == 0 {
            while x > 0 && y > 0 {
                ops.push(LineOp::Equal(a[(x - 1) as usize]));
                x -= 1;
                y -= 1;
            }
            break;
        }

        let at = |k: isize| window[(k + d) as usize];
        let k = x - y;
        let prev_k = if k == -d || (k != d && at(k - 1) < at(k + 1)) {
            k + 1
        } else {
            k - 1
        };
        let prev_x = at(prev_k);
        let prev_y = prev_x - prev_k;

        while x > prev_x && y > prev_y {
            ops.push(LineOp::Equal(a[(x - 1) as usize]));
            x -= 1;
            y -= 1;
        }
        if x == prev_x {
            ops.push(LineOp::Insert(b[(y - 1) as usize]));
        } else {
            ops.push(LineOp::Delete(a[(x - 1) as usize]));
        }
        x = prev_x;
        y = prev_y;
    }
    ops.reverse();
    Some(ops)
}

/// Render an edit script as a unified diff; empty when nothing changed
pub fn render_unified(ops: &[LineOp<'_>], from_label: &str, to_label: &str) -> String {
    let hunks = group_hunks(ops, CONTEXT_LINES);
    if hunks.is_empty() {
        return String::new();
    }

    // Line positions on each side before each op.
    let mut old_pos = Vec::with_capacity(ops.len() + 1);
    let mut new_pos = Vec::with_capacity(ops.len() + 1);
    let (mut o, mut n) = (0usize, 0usize);
    for op in ops {
        old_pos.push(o);
        new_pos.push(n);
        match op {
            LineOp::Equal(_) => {
                o += 1;
                n += 1;
            }
            LineOp::Delete(_) => o += 1,
            LineOp::Insert(_) => n += 1,
        }
    }
    old_pos.push(o);
    new_pos.push(n);

    let mut out = vec![format!("--- {}", from_label), format!("+++ {}", to_label)];
    for (start, end) in hunks {
        let old_len = old_pos[end] - old_pos[start];
        let new_len = new_pos[end] - new_pos[start];
        out.push(format!(
            "@@ -{} +{} @@",
            format_range(old_pos[start], old_len),
            format_range(new_pos[start], new_len)
        ));
        for op in &ops[start..end] {
            out.push(match op {
                LineOp::Equal(l) => format!(" {}", l),
                LineOp::Delete(l) => format!("-{}", l),
                LineOp::Insert(l) => format!("+{}", l),
            });
        }
    }
    out.join("\n")
}

/// Op-index ranges `[start, end)` of hunks; changes closer than
/// `2 * context` unchanged lines share a hunk.
fn group_hunks(ops: &[LineOp<'_>], context: usize) -> Vec<(usize, usize)> {
    let mut hunks: Vec<(usize, usize)> = Vec::new();
    for (i, _) in ops.iter().enumerate().filter(|(_, op)| op.is_change()) {
        let start = i.saturating_sub(context);
        let end = (i + context + 1).min(ops.len());
        match hunks.last_mut() {
            Some(last) if start <= last.1 => last.1 = end,
            _ => hunks.push((start, end)),
        }
    }
    hunks
}

/// `start,len` in 1-based unified-diff notation
fn format_range(start: usize, len: usize) -> String {
    match len {
        1 => format!("{}", start + 1),
        0 => format!("{},0", start),
        _ => format!("{},{}", start + 1, len),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn additions(diff: &str) -> usize {
        diff.lines()
            .filter(|l| l.starts_with('+') && !l.starts_with("+++"))
            .count()
    }

    fn removals(diff: &str) -> usize {
        diff.lines()
            .filter(|l| l.starts_with('-') && !l.starts_with("---"))
            .count()
    }

    #[test]
    fn test_identical_texts_produce_empty_diff() {
        assert_eq!(unified_diff(b"a\nb\nc\n", b"a\nb\nc\n"), "");
    }

    #[test]
    fn test_single_replacement() {
        let diff = unified_diff(b"A", b"B");
        assert_eq!(diff, "--- old\n+++ new\n@@ -1 +1 @@\n-A\n+B");
    }

    #[test]
    fn test_one_inserted_line_has_one_addition_marker() {
        let diff = unified_diff(b"a\nb\nc\nd\n", b"a\nb\nX\nc\nd\n");
        assert_eq!(additions(&diff), 1);
        assert_eq!(removals(&diff), 0);
        assert!(diff.contains("@@ -1,4 +1,5 @@"));
        assert!(diff.contains("\n+X\n"));
    }

    #[test]
    fn test_insertion_into_empty_old_uses_zero_range() {
        let diff = unified_diff(b"", b"first\n");
        assert!(diff.contains("@@ -0,0 +1 @@"));
    }

    #[test]
    fn test_distant_changes_form_separate_hunks() {
        let old: Vec<String> = (0..30).map(|i| format!("line {}", i)).collect();
        let mut new = old.clone();
        new[2] = "changed 2".to_string();
        new[25] = "changed 25".to_string();
        let diff = unified_diff_text(&old.join("\n"), &new.join("\n"));
        assert_eq!(diff.matches("@@ -").count(), 2);
        assert_eq!(additions(&diff), 2);
        assert_eq!(removals(&diff), 2);
    }

    #[test]
    fn test_nearby_changes_share_a_hunk() {
        let old: Vec<String> = (0..20).map(|i| format!("line {}", i)).collect();
        let mut new = old.clone();
        new[5] = "x".to_string();
        new[10] = "y".to_string();
        let diff = unified_diff_text(&old.join("\n"), &new.join("\n"));
        assert_eq!(diff.matches("@@ -").count(), 1);
    }

    #[test]
    fn test_invalid_utf8_is_replaced_not_rejected() {
        let diff = unified_diff(b"ok\n\xff\xfe\n", b"ok\nfine\n");
        assert!(diff.contains("+fine"));
        assert_eq!(removals(&diff), 1);
    }

    #[test]
    fn test_edit_script_reconstructs_both_sides() {
        let a = ["a", "b", "c", "a", "b", "b", "a"];
        let b = ["c", "b", "a", "b", "a", "c"];
        let ops = diff_lines(&a, &b);

        let old: Vec<&str> = ops
            .iter()
            .filter_map(|op| match op {
                LineOp::Equal(l) | LineOp::Delete(l) => Some(*l),
                LineOp::Insert(_) => None,
            })
            .collect();
        let new: Vec<&str> = ops
            .iter()
            .filter_map(|op| match op {
                LineOp::Equal(l) | LineOp::Insert(l) => Some(*l),
                LineOp::Delete(_) => None,
            })
            .collect();

        assert_eq!(old, a);
        assert_eq!(new, b);
        // Myers' classic example has edit distance 5
        assert_eq!(ops.iter().filter(|op| op.is_change()).count(), 5);
    }

    #[test]
    fn test_scattered_edits_in_a_large_page_stay_minimal() {
        let old: Vec<String> = (0..20_000).map(|i| format!("line {}", i)).collect();
        let mut new = old.clone();
        for i in (50..20_000).step_by(100) {
            new[i] = format!("edited {}", i);
        }
        let diff = unified_diff_text(&old.join("\n"), &new.join("\n"));
        assert_eq!(additions(&diff), 200);
        assert_eq!(removals(&diff), 200);
    }

    #[test]
    fn test_full_rewrite_of_a_large_page_falls_back_to_replacement() {
        let old: Vec<String> = (0..20_000).map(|i| format!("old line {}", i)).collect();
        let new: Vec<String> = (0..20_000).map(|i| format!("new line {}", i)).collect();

        let started = std::time::Instant::now();
        let diff = unified_diff_text(&old.join("\n"), &new.join("\n"));

        assert_eq!(removals(&diff), 20_000);
        assert_eq!(additions(&diff), 20_000);
        assert_eq!(diff.matches("@@ -").count(), 1);
        assert!(started.elapsed() < std::time::Duration::from_secs(30));
    }
}
