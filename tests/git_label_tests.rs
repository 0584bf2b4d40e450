//! Version labels from a real git repository
//!
//! Each test builds a throwaway repository. Tests are skipped when `git` is
//! not installed.

use plugin_packager::label::{DEFAULT_REVISION, HASH_ABBREV};
use plugin_packager::{GitCli, LabelStrategy, SystemRunner, resolve_version_label};
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use tempfile::TempDir;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(repo: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=Packager Tests",
            "-c",
            "user.email=tests@example.invalid",
            "-c",
            "commit.gpgsign=false",
            "-c",
            "tag.gpgsign=false",
        ])
        .args(args)
        .current_dir(repo)
        .output()
        .expect("git should run");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn repo_with_commits(count: usize) -> TempDir {
    let dir = TempDir::new().unwrap();
    git(dir.path(), &["init", "-q"]);
    for i in 0..count {
        git(dir.path(), &["commit", "-q", "--allow-empty", "-m", &format!("commit {}", i)]);
    }
    dir
}

fn label(repo: &Path) -> plugin_packager::Result<String> {
    let git = GitCli::new(repo, Arc::new(SystemRunner));
    resolve_version_label(&git, DEFAULT_REVISION, &LabelStrategy::fallback_chain())
}

#[test]
fn test_exact_tag() {
    if !git_available() {
        eprintln!("git not installed, skipping");
        return;
    }
    let repo = repo_with_commits(1);
    git(repo.path(), &["tag", "v1.2.3"]);

    assert_eq!(label(repo.path()).unwrap(), "v1.2.3");
}

#[test]
fn test_commits_past_tag() {
    if !git_available() {
        eprintln!("git not installed, skipping");
        return;
    }
    let repo = repo_with_commits(1);
    git(repo.path(), &["tag", "-a", "v1.2.3", "-m", "release"]);
    for i in 0..3 {
        git(repo.path(), &["commit", "-q", "--allow-empty", "-m", &format!("after {}", i)]);
    }
    let hash = git(repo.path(), &["rev-parse", "--short=7", "HEAD"]);

    assert_eq!(label(repo.path()).unwrap(), format!("v1.2.3-3-g{}", hash));
}

#[test]
fn test_untagged_history_gives_fixed_length_hash() {
    if !git_available() {
        eprintln!("git not installed, skipping");
        return;
    }
    let repo = repo_with_commits(2);

    let label = label(repo.path()).unwrap();
    assert_eq!(label.len(), HASH_ABBREV);
    assert!(label.chars().all(|c| c.is_ascii_hexdigit()), "label: {}", label);
}

#[test]
fn test_unknown_revision_fails() {
    if !git_available() {
        eprintln!("git not installed, skipping");
        return;
    }
    let repo = repo_with_commits(1);
    let git = GitCli::new(repo.path(), Arc::new(SystemRunner));

    let err = resolve_version_label(&git, "no-such-revision", &LabelStrategy::fallback_chain())
        .unwrap_err();
    match err {
        plugin_packager::PackagerError::VersionLabel { revision, attempts } => {
            assert_eq!(revision, "no-such-revision");
            assert_eq!(attempts.len(), 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}
