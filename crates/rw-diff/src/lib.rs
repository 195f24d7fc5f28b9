//! Diff renderer for Regulatory Watch.
//!
//! When a statute is reclassified as modified and both the previous and the
//! current text bodies are known, the bodies are compared line by line and
//! the result is published as a standalone HTML page next to the other run
//! artifacts.
//!
//! # Key Types
//!
//! - [`LineDiff`] / [`DiffHunk`] / [`DiffLine`] -- Line-level text diff
//! - [`DiffArtifact`] -- Rendered HTML page plus its deterministic file name

pub mod error;
pub mod render;
pub mod text_diff;

pub use error::{DiffError, DiffResult};
pub use render::{artifact_file_name, render_html, DiffArtifact, DIFF_DIR};
pub use text_diff::{diff_text, DiffHunk, DiffLine, LineDiff};
