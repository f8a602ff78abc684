//! `vigil check` against real temporary git repositories.

mod common;

use common::{commit_all, init_repo, vigil_cmd, write_file};
use predicates::prelude::*;

const RULESET: &str = r#"
concerns:
  versions:
    signals:
      - watch: { type: jq, include: "package.json", query: ".version" }
        report:
          type: handlebars
          template: "version changed: {{left.artifact}} -> {{right.artifact}}"
        notify:
          labels: [release]
"#;

#[test]
fn check_reports_version_bump_between_commits() {
    let repo = init_repo(&[
        ("vigil.yml", RULESET),
        ("package.json", "{\"version\":\"1.0.0\"}\n"),
    ]);

    write_file(repo.path(), "package.json", "{\"version\":\"2.0.0\"}\n");
    commit_all(repo.path(), "bump version");

    vigil_cmd()
        .args(["check", "--base", "HEAD~1", "--head", "HEAD"])
        .arg("--repo")
        .arg(repo.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "version changed: \"1.0.0\" -> \"2.0.0\"",
        ));
}

#[test]
fn check_working_tree_against_head() {
    let repo = init_repo(&[
        ("vigil.yml", RULESET),
        ("package.json", "{\"version\":\"1.0.0\"}\n"),
    ]);

    // Uncommitted change in the working tree.
    write_file(repo.path(), "package.json", "{\"version\":\"1.1.0\"}\n");

    vigil_cmd()
        .arg("check")
        .arg("--repo")
        .arg(repo.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"1.0.0\" -> \"1.1.0\""));
}

#[test]
fn check_without_changes_prints_nothing_reportable() {
    let repo = init_repo(&[
        ("vigil.yml", RULESET),
        ("package.json", "{\"version\":\"1.0.0\"}\n"),
    ]);

    vigil_cmd()
        .arg("check")
        .arg("--repo")
        .arg(repo.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No reportable changes."));
}

#[test]
fn check_json_emits_structured_output() {
    let repo = init_repo(&[
        ("vigil.yml", RULESET),
        ("package.json", "{\"version\":\"1.0.0\"}\n"),
    ]);

    write_file(repo.path(), "package.json", "{\"version\":\"2.0.0\"}\n");
    commit_all(repo.path(), "bump version");

    let assert = vigil_cmd()
        .args(["check", "--base", "HEAD~1", "--head", "HEAD", "--json"])
        .arg("--repo")
        .arg(repo.path())
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let reports = parsed["reports"].as_array().expect("reports array");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["metadata"]["fileName"], "package.json");
    assert_eq!(reports[0]["notify"]["labels"][0], "release");
    assert!(reports[0]["metadata"]["diffText"]
        .as_str()
        .unwrap()
        .contains("+\"2.0.0\""));
}

#[test]
fn check_ignores_files_outside_include_globs() {
    let repo = init_repo(&[
        ("vigil.yml", RULESET),
        ("package.json", "{\"version\":\"1.0.0\"}\n"),
        ("README.md", "hello\n"),
    ]);

    write_file(repo.path(), "README.md", "hello world\n");
    commit_all(repo.path(), "docs");

    vigil_cmd()
        .args(["check", "--base", "HEAD~1", "--head", "HEAD"])
        .arg("--repo")
        .arg(repo.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No reportable changes."));
}

#[test]
fn check_with_missing_config_fails() {
    let repo = init_repo(&[("file.txt", "x\n")]);

    vigil_cmd()
        .arg("check")
        .arg("--repo")
        .arg(repo.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config invalid"));
}

#[test]
fn check_added_file_reports_with_empty_left() {
    let repo = init_repo(&[("vigil.yml", RULESET)]);

    write_file(repo.path(), "package.json", "{\"version\":\"0.1.0\"}\n");
    commit_all(repo.path(), "add manifest");

    vigil_cmd()
        .args(["check", "--base", "HEAD~1", "--head", "HEAD"])
        .arg("--repo")
        .arg(repo.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("version changed:  -> \"0.1.0\""));
}
