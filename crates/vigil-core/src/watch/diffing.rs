//! Artifact-level diffing shared by every watch.
//!
//! The two extractor outputs are compared line-by-line; the resulting
//! unified diff is what reports render, and its first hunk header is where
//! the optional line range comes from.

use regex::Regex;
use serde::Serialize;
use similar::TextDiff;

/// The first changed region of the filtered artifact, new side, inclusive.
///
/// These are line numbers *within the filtered artifact's diff*, not in the
/// source file. Consumers wanting source positions must map them
/// separately; the engine deliberately does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

/// Unified diff of the two artifacts with three lines of context.
pub fn unified_artifact_diff(left: &str, right: &str) -> String {
    TextDiff::from_lines(left, right)
        .unified_diff()
        .context_radius(3)
        .header("left", "right")
        .to_string()
}

/// Parse the first hunk header's new side into a [`LineRange`].
///
/// Matches `@@ -a,b +c,d @@` where the counts may be omitted (defaulting
/// to 1). Returns `None` when no header is present.
pub fn first_hunk_range(diff_text: &str) -> Option<LineRange> {
    let header = Regex::new(r"(?m)^@@ -\d+(?:,\d+)? \+(\d+)(?:,(\d+))? @@").ok()?;
    let caps = header.captures(diff_text)?;
    let start: u32 = caps.get(1)?.as_str().parse().ok()?;
    let length: u32 = match caps.get(2) {
        Some(len) => len.as_str().parse().ok()?,
        None => 1,
    };
    Some(LineRange {
        start,
        end: start + length.saturating_sub(1),
    })
}
