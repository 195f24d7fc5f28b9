//! HTML rendering and naming of diff artifacts.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{DiffError, DiffResult};
use crate::text_diff::{diff_text, DiffLine, LineDiff};

/// Subdirectory of the output directory holding diff pages.
pub const DIFF_DIR: &str = "diffs";

/// Hex characters of the identity hash kept in artifact names.
const NAME_HASH_LEN: usize = 16;

const STYLE: &str = "body{font-family:sans-serif;margin:1.5em}\
table{border-collapse:collapse;font-family:monospace;width:100%}\
td{padding:0 .5em;white-space:pre-wrap;vertical-align:top}\
td.n{color:#888;text-align:right;width:3em}\
tr.add{background:#e6ffed}tr.del{background:#ffeef0}\
tr.hunk td{background:#f1f8ff;color:#555}";

/// A rendered diff page ready to be published.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffArtifact {
    /// File name inside [`DIFF_DIR`].
    pub file_name: String,
    /// The complete HTML document.
    pub html: String,
    /// Lines added by the new body.
    pub additions: usize,
    /// Lines removed from the old body.
    pub deletions: usize,
}

impl DiffArtifact {
    /// Diff two bodies and render the page for `identity` at `date`.
    pub fn render(
        identity: &str,
        date: &str,
        old_label: &str,
        new_label: &str,
        old: &str,
        new: &str,
    ) -> Self {
        let diff = diff_text(old, new);
        Self {
            file_name: artifact_file_name(identity, date),
            html: render_html(identity, old_label, new_label, &diff),
            additions: diff.additions(),
            deletions: diff.deletions(),
        }
    }

    /// Path of the artifact relative to the output directory, with `/`
    /// separators.
    pub fn relative_path(&self) -> String {
        format!("{DIFF_DIR}/{}", self.file_name)
    }

    /// Write the page under `<out_dir>/diffs/`, replacing any previous copy.
    pub fn write(&self, out_dir: &Path) -> DiffResult<PathBuf> {
        if self.file_name.is_empty()
            || self.file_name.contains(['/', '\\'])
            || self.file_name.starts_with('.')
        {
            return Err(DiffError::InvalidName(self.file_name.clone()));
        }
        let path = out_dir.join(DIFF_DIR).join(&self.file_name);
        rw_store::write_atomic(&path, self.html.as_bytes())?;
        debug!(
            path = %path.display(),
            additions = self.additions,
            deletions = self.deletions,
            "diff artifact written"
        );
        Ok(path)
    }
}

/// Deterministic artifact name: `statute-<hash>-<date>.html`, where `<hash>`
/// is the first 16 hex characters of the BLAKE3 hash of the identity key and
/// `<date>` keeps only the digits of the record date.
pub fn artifact_file_name(identity: &str, date: &str) -> String {
    let hash = blake3::hash(identity.as_bytes());
    let mut hex = hex::encode(hash.as_bytes());
    hex.truncate(NAME_HASH_LEN);
    let digits: String = date.chars().filter(char::is_ascii_digit).collect();
    let date = if digits.is_empty() { "undated".to_string() } else { digits };
    format!("statute-{hex}-{date}.html")
}

/// Render a self-contained HTML page for `diff`.
///
/// The output depends only on the arguments.
pub fn render_html(title: &str, old_label: &str, new_label: &str, diff: &LineDiff) -> String {
    let mut out = String::new();
    let title = escape_html(title);
    let old_label = escape_html(old_label);
    let new_label = escape_html(new_label);

    out.push_str(&format!(
        "<!DOCTYPE html>\n<html lang=\"ko\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <h1>{title}</h1>\n<p><span class=\"old\">{old_label}</span> &rarr; \
         <span class=\"new\">{new_label}</span> \
         (+{add} / -{del})</p>\n",
        add = diff.additions(),
        del = diff.deletions(),
    ));

    if diff.is_empty() {
        out.push_str("<p>본문 변경 없음</p>\n</body>\n</html>\n");
        return out;
    }

    out.push_str("<table>\n");
    for hunk in &diff.hunks {
        out.push_str(&format!(
            "<tr class=\"hunk\"><td class=\"n\"></td><td class=\"n\"></td><td>{}</td></tr>\n",
            hunk.header()
        ));
        let mut old_no = hunk.old_start;
        let mut new_no = hunk.new_start;
        for line in &hunk.lines {
            let (class, old_col, new_col, marker, text) = match line {
                DiffLine::Context(t) => {
                    let row = ("ctx", old_no.to_string(), new_no.to_string(), ' ', t);
                    old_no += 1;
                    new_no += 1;
                    row
                }
                DiffLine::Removed(t) => {
                    let row = ("del", old_no.to_string(), String::new(), '-', t);
                    old_no += 1;
                    row
                }
                DiffLine::Added(t) => {
                    let row = ("add", String::new(), new_no.to_string(), '+', t);
                    new_no += 1;
                    row
                }
            };
            out.push_str(&format!(
                "<tr class=\"{class}\"><td class=\"n\">{old_col}</td><td class=\"n\">{new_col}</td><td>{marker} {}</td></tr>\n",
                escape_html(text)
            ));
        }
    }
    out.push_str("</table>\n</body>\n</html>\n");
    out
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_is_deterministic() {
        let a = artifact_file_name("Clean Air Act", "2022-05-05");
        let b = artifact_file_name("Clean Air Act", "20220505");
        assert_eq!(a, b);
        assert!(a.starts_with("statute-"));
        assert!(a.ends_with("-20220505.html"));
        assert_eq!(a.len(), "statute-".len() + 16 + "-20220505.html".len());
        assert_ne!(a, artifact_file_name("Clean Water Act", "20220505"));
    }

    #[test]
    fn undated_name() {
        assert!(artifact_file_name("x", "").ends_with("-undated.html"));
    }

    #[test]
    fn render_escapes_markup() {
        let art = DiffArtifact::render(
            "A<B>",
            "20210101",
            "20210101",
            "20220505",
            "<script>old</script>\n",
            "new & improved\n",
        );
        assert!(!art.html.contains("<script>"));
        assert!(art.html.contains("&lt;script&gt;old&lt;/script&gt;"));
        assert!(art.html.contains("new &amp; improved"));
        assert!(art.html.contains("<title>A&lt;B&gt;</title>"));
        assert_eq!((art.additions, art.deletions), (1, 1));
    }

    #[test]
    fn render_is_deterministic() {
        let one = DiffArtifact::render("t", "20220505", "a", "b", "x\ny\n", "x\nz\n");
        let two = DiffArtifact::render("t", "20220505", "a", "b", "x\ny\n", "x\nz\n");
        assert_eq!(one, two);
    }

    #[test]
    fn render_emits_one_row_per_line() {
        let diff = diff_text("a\nb\nc\n", "a\nB\nc\n");
        let html = render_html("t", "old", "new", &diff);
        assert_eq!(html.matches("<tr class=\"hunk\">").count(), 1);
        assert_eq!(html.matches("<tr class=\"ctx\">").count(), 2);
        assert!(html.contains("<td>- b</td></tr>\n"));
        assert!(html.contains("<td>+ B</td></tr>\n"));
        assert!(html.contains("(+1 / -1)"));
    }

    #[test]
    fn identical_bodies_render_notice() {
        let art = DiffArtifact::render("t", "20220505", "a", "b", "same\n", "same\n");
        assert!(art.html.contains("본문 변경 없음"));
        assert_eq!(art.additions, 0);
    }

    #[test]
    fn write_places_file_under_diff_dir() {
        let dir = tempfile::tempdir().unwrap();
        let art = DiffArtifact::render("Clean Air Act", "20220505", "a", "b", "old\n", "new\n");
        let path = art.write(dir.path()).unwrap();
        assert_eq!(path, dir.path().join(DIFF_DIR).join(&art.file_name));
        assert_eq!(std::fs::read_to_string(path).unwrap(), art.html);
        assert_eq!(art.relative_path(), format!("diffs/{}", art.file_name));
    }

    #[test]
    fn write_rejects_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut art = DiffArtifact::render("t", "1", "a", "b", "x\n", "y\n");
        art.file_name = "../escape.html".into();
        assert!(matches!(art.write(dir.path()), Err(DiffError::InvalidName(_))));
    }
}
