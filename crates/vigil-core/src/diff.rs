//! Unified diff parsing.
//!
//! Turns raw `git diff` output into structured [`FileChange`] records:
//! old/new paths, a [`ChangeKind`], and the hunks with their line ranges.
//! The parser is tolerant by design — unknown header lines are skipped, and
//! an empty input yields an empty sequence rather than an error.

use serde::Serialize;

/// How a file changed between the two revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// File exists only on the new side.
    Add,
    /// File exists only on the old side.
    Delete,
    /// File content changed in place.
    Modify,
    /// File moved; old and new paths differ.
    Rename,
    /// File copied from another path.
    Copy,
}

/// One hunk of a unified diff.
///
/// Ranges come straight from the `@@ -a,b +c,d @@` header; a count omitted
/// in the header defaults to 1. `lines` holds the hunk body verbatim,
/// including `\ No newline at end of file` markers.
#[derive(Debug, Clone, Serialize)]
pub struct Hunk {
    pub old_start: u32,
    pub old_count: u32,
    pub new_start: u32,
    pub new_count: u32,
    pub lines: Vec<String>,
}

/// A single file's change within a diff.
#[derive(Debug, Clone, Serialize)]
pub struct FileChange {
    /// Path on the old side. `None` for added files.
    pub old_path: Option<String>,
    /// Path on the new side. `None` for deleted files.
    pub new_path: Option<String>,
    /// The kind of change.
    pub kind: ChangeKind,
    /// Hunks in diff order. Empty for binary files and pure renames.
    pub hunks: Vec<Hunk>,
    /// Whether the diff marked this file as binary.
    pub binary: bool,
}

impl FileChange {
    /// The path watches should be gated on: the new path, falling back to
    /// the old path for deletions.
    pub fn effective_path(&self) -> &str {
        self.new_path
            .as_deref()
            .or(self.old_path.as_deref())
            .unwrap_or("")
    }
}

/// Parse raw unified-diff text into structured [`FileChange`] entries.
///
/// Handles added-file headers (`new file mode`), deleted-file headers
/// (`deleted file mode`), rename/copy headers, binary markers, and
/// absent-newline markers. Empty input yields an empty vec.
pub fn parse_unified_diff(input: &str) -> Vec<FileChange> {
    let lines: Vec<&str> = input.lines().collect();
    let mut files = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if !lines[i].starts_with("diff --git ") {
            i += 1;
            continue;
        }

        let (header_old, header_new) = parse_git_header(lines[i]);
        let mut file = FileChange {
            old_path: header_old,
            new_path: header_new,
            kind: ChangeKind::Modify,
            hunks: Vec::new(),
            binary: false,
        };
        i += 1;

        // Extended headers and ---/+++ lines up to the first hunk.
        while i < lines.len() {
            let line = lines[i];
            if line.starts_with("diff --git ") || line.starts_with("@@ ") {
                break;
            }

            if line.starts_with("new file mode") {
                file.kind = ChangeKind::Add;
                file.old_path = None;
            } else if line.starts_with("deleted file mode") {
                file.kind = ChangeKind::Delete;
                file.new_path = None;
            } else if let Some(path) = line.strip_prefix("rename from ") {
                file.kind = ChangeKind::Rename;
                file.old_path = Some(path.to_string());
            } else if let Some(path) = line.strip_prefix("rename to ") {
                file.kind = ChangeKind::Rename;
                file.new_path = Some(path.to_string());
            } else if let Some(path) = line.strip_prefix("copy from ") {
                file.kind = ChangeKind::Copy;
                file.old_path = Some(path.to_string());
            } else if let Some(path) = line.strip_prefix("copy to ") {
                file.kind = ChangeKind::Copy;
                file.new_path = Some(path.to_string());
            } else if line.starts_with("Binary files ") || line == "GIT binary patch" {
                file.binary = true;
            } else if let Some(path) = line.strip_prefix("--- ") {
                if path == "/dev/null" {
                    file.old_path = None;
                } else {
                    file.old_path = Some(strip_prefix_marker(path, "a/"));
                }
            } else if let Some(path) = line.strip_prefix("+++ ") {
                if path == "/dev/null" {
                    file.new_path = None;
                } else {
                    file.new_path = Some(strip_prefix_marker(path, "b/"));
                }
            }
            // "index ...", "similarity index ...", mode lines: skipped.

            i += 1;
        }

        // Hunks until the next file header.
        while i < lines.len() && !lines[i].starts_with("diff --git ") {
            if lines[i].starts_with("@@ ") {
                if let Some(hunk) = parse_hunk(&lines, &mut i) {
                    file.hunks.push(hunk);
                    continue;
                }
            }
            i += 1;
        }

        // Reconcile kind with path presence for diffs without mode headers.
        if file.kind == ChangeKind::Modify {
            match (&file.old_path, &file.new_path) {
                (None, Some(_)) => file.kind = ChangeKind::Add,
                (Some(_), None) => file.kind = ChangeKind::Delete,
                _ => {}
            }
        }

        files.push(file);
    }

    files
}

/// Extract old/new paths from a `diff --git a/X b/Y` line.
///
/// Used as a fallback for files whose body carries no `---`/`+++` lines
/// (pure renames, binary files). Paths containing ` b/` are ambiguous in
/// this header; the `---`/`+++`/rename lines win when present.
fn parse_git_header(line: &str) -> (Option<String>, Option<String>) {
    let rest = match line.strip_prefix("diff --git ") {
        Some(r) => r,
        None => return (None, None),
    };
    let Some(split) = rest.find(" b/") else {
        return (None, None);
    };
    let old = strip_prefix_marker(&rest[..split], "a/");
    let new = rest[split + 3..].to_string();
    (Some(old), Some(new))
}

fn strip_prefix_marker(path: &str, marker: &str) -> String {
    path.strip_prefix(marker).unwrap_or(path).to_string()
}

/// Parse a single hunk starting at the `@@` line. Advances `i` past the
/// hunk body on success; leaves it untouched on a malformed header.
fn parse_hunk(lines: &[&str], i: &mut usize) -> Option<Hunk> {
    let header = lines[*i].strip_prefix("@@ ")?;
    let header = &header[..header.find(" @@")?];
    let mut parts = header.split(' ');

    let (old_start, old_count) = parse_range(parts.next()?.strip_prefix('-')?)?;
    let (new_start, new_count) = parse_range(parts.next()?.strip_prefix('+')?)?;

    let mut body = Vec::new();
    *i += 1;
    while *i < lines.len() {
        let line = lines[*i];
        if line.starts_with("@@") || line.starts_with("diff --git ") {
            break;
        }
        if line.starts_with('+')
            || line.starts_with('-')
            || line.starts_with(' ')
            || line.starts_with('\\')
            || line.is_empty()
        {
            body.push(line.to_string());
            *i += 1;
        } else {
            break;
        }
    }

    Some(Hunk {
        old_start,
        old_count,
        new_start,
        new_count,
        lines: body,
    })
}

/// Parse a range like `start,count` or `start` (count defaults to 1).
fn parse_range(s: &str) -> Option<(u32, u32)> {
    match s.split_once(',') {
        Some((start, count)) => Some((start.parse().ok()?, count.parse().ok()?)),
        None => Some((s.parse().ok()?, 1)),
    }
}
