//! Line-by-line comparison of two text bodies.
//!
//! Uses the `similar` crate (Myers diff algorithm) to produce structured
//! hunks with context lines.

use similar::{ChangeTag, TextDiff};

/// Unchanged lines kept around each change.
pub const CONTEXT_LINES: usize = 3;

/// The result of diffing two text bodies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineDiff {
    /// The diff hunks.
    pub hunks: Vec<DiffHunk>,
    /// Total number of lines in the old text.
    pub old_lines: usize,
    /// Total number of lines in the new text.
    pub new_lines: usize,
}

impl LineDiff {
    /// Returns `true` if the two texts are identical.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// Total number of lines added across all hunks.
    pub fn additions(&self) -> usize {
        self.lines()
            .filter(|l| matches!(l, DiffLine::Added(_)))
            .count()
    }

    /// Total number of lines removed across all hunks.
    pub fn deletions(&self) -> usize {
        self.lines()
            .filter(|l| matches!(l, DiffLine::Removed(_)))
            .count()
    }

    fn lines(&self) -> impl Iterator<Item = &DiffLine> {
        self.hunks.iter().flat_map(|h| &h.lines)
    }
}

/// A contiguous region of changes in a diff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffHunk {
    /// Line number in the old text where this hunk starts (1-based).
    pub old_start: usize,
    /// Number of lines from the old text in this hunk.
    pub old_count: usize,
    /// Line number in the new text where this hunk starts (1-based).
    pub new_start: usize,
    /// Number of lines from the new text in this hunk.
    pub new_count: usize,
    /// The individual diff lines in this hunk.
    pub lines: Vec<DiffLine>,
}

impl DiffHunk {
    /// Unified-diff style range header, e.g. `@@ -3,4 +3,5 @@`.
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_count, self.new_start, self.new_count
        )
    }
}

/// A single line in a diff hunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffLine {
    /// A line present in both texts.
    Context(String),
    /// A line only in the new text.
    Added(String),
    /// A line only in the old text.
    Removed(String),
}

/// Compute a line-by-line diff between two texts.
///
/// Line endings are normalized, so `\r\n` and `\n` bodies compare equal and
/// a missing final newline is not reported as a change.
pub fn diff_text(old: &str, new: &str) -> LineDiff {
    let old = normalize_newlines(old);
    let new = normalize_newlines(new);
    let old_lines = old.lines().count();
    let new_lines = new.lines().count();

    if old == new {
        return LineDiff {
            hunks: Vec::new(),
            old_lines,
            new_lines,
        };
    }

    let text_diff = TextDiff::from_lines(old.as_str(), new.as_str());
    let mut hunks = Vec::new();

    for group in text_diff.grouped_ops(CONTEXT_LINES) {
        let Some(first) = group.first() else {
            continue;
        };
        let mut hunk = DiffHunk {
            old_start: first.old_range().start + 1,
            old_count: 0,
            new_start: first.new_range().start + 1,
            new_count: 0,
            lines: Vec::new(),
        };

        for op in &group {
            for change in text_diff.iter_changes(op) {
                let text = change.value().trim_end_matches('\n').to_string();
                match change.tag() {
                    ChangeTag::Equal => {
                        hunk.lines.push(DiffLine::Context(text));
                        hunk.old_count += 1;
                        hunk.new_count += 1;
                    }
                    ChangeTag::Delete => {
                        hunk.lines.push(DiffLine::Removed(text));
                        hunk.old_count += 1;
                    }
                    ChangeTag::Insert => {
                        hunk.lines.push(DiffLine::Added(text));
                        hunk.new_count += 1;
                    }
                }
            }
        }

        hunks.push(hunk);
    }

    LineDiff {
        hunks,
        old_lines,
        new_lines,
    }
}

/// `\n` line endings, and a final newline on non-empty text so that the last
/// line compares equal whether or not the source terminated it.
fn normalize_newlines(text: &str) -> String {
    let mut out = text.replace("\r\n", "\n");
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out
}
