//! Shared test utilities for vigil-cli integration tests.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Get a Command for the vigil binary.
#[allow(deprecated)]
pub fn vigil_cmd() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("vigil").expect("vigil binary should exist")
}

/// Run a git command in `dir`, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .expect("git should be runnable");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Create a temp repository with an identity configured and an initial
/// commit containing the given files.
pub fn init_repo(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    let root = dir.path();

    git(root, &["init", "--initial-branch=main"]);
    git(root, &["config", "user.email", "vigil@test"]);
    git(root, &["config", "user.name", "vigil test"]);

    for (path, content) in files {
        write_file(root, path, content);
    }
    git(root, &["add", "-A"]);
    git(root, &["commit", "-m", "initial"]);

    dir
}

/// Write a file under the repo, creating parent directories.
pub fn write_file(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    if let Some(parent) = full.parent() {
        std::fs::create_dir_all(parent).expect("mkdir");
    }
    std::fs::write(full, content).expect("write");
}

/// Stage and commit everything with the given message.
pub fn commit_all(root: &Path, message: &str) {
    git(root, &["add", "-A"]);
    git(root, &["commit", "-m", message]);
}
