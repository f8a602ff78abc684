//! Git subprocess glue.
//!
//! Diff acquisition and revision content via the `git` binary, plus the
//! [`GitContentProvider`] that backs runs with a real repository. The
//! sentinel revision `.` (or empty) reads from the working tree.

use std::path::PathBuf;
use std::process::Command;

use vigil_core::{ContentProvider, VigilError, WORKING_TREE};

/// A local git repository addressed by its root directory.
#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Unified diff between two revisions. When `head` is the working-tree
    /// sentinel, diffs `base` against the working directory.
    pub fn diff(&self, base: &str, head: &str) -> anyhow::Result<String> {
        let mut command = Command::new("git");
        command.current_dir(&self.root).arg("diff");
        if is_working_tree(head) {
            command.arg(base);
        } else {
            command.arg(format!("{base}..{head}"));
        }

        let output = command.output()?;
        if !output.status.success() {
            anyhow::bail!(
                "git diff failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Content of `path` at `revision`, or `None` when the file does not
    /// exist there. Working-tree reads go straight to the filesystem.
    pub fn show(&self, revision: &str, path: &str) -> Result<Option<String>, VigilError> {
        if is_working_tree(revision) {
            return match std::fs::read_to_string(self.root.join(path)) {
                Ok(content) => Ok(Some(content)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(VigilError::Provider(format!(
                    "failed to read {path} from working tree: {e}"
                ))),
            };
        }

        let output = Command::new("git")
            .current_dir(&self.root)
            .args(["show", &format!("{revision}:{path}")])
            .output()
            .map_err(|e| VigilError::Provider(format!("failed to spawn git: {e}")))?;

        if output.status.success() {
            Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
        } else {
            // git exits nonzero both for missing paths and unknown
            // revisions; either way the content is absent here.
            tracing::debug!(
                "git show {revision}:{path} returned {}",
                output.status
            );
            Ok(None)
        }
    }
}

fn is_working_tree(revision: &str) -> bool {
    revision.is_empty() || revision == WORKING_TREE
}

/// [`ContentProvider`] backed by a local git repository.
pub struct GitContentProvider {
    repo: GitRepo,
}

impl GitContentProvider {
    pub fn new(repo: GitRepo) -> Self {
        Self { repo }
    }
}

impl ContentProvider for GitContentProvider {
    fn fetch(&self, revision: &str, path: &str) -> Result<Option<String>, VigilError> {
        self.repo.show(revision, path)
    }
}
