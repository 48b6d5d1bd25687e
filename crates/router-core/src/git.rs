//! Git integration for resolving a release tag to its commit.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use crate::error::{Result, RouterError};

/// Resolve the commit a reference points at.
///
/// Runs `git rev-parse <reference>^{commit}` in `repo_dir`, so annotated tags
/// resolve to the tagged commit rather than the tag object.
pub fn rev_parse_commit(repo_dir: &Path, reference: &str) -> Result<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--verify", "--quiet"])
        .arg(format!("{reference}^{{commit}}"))
        .current_dir(repo_dir)
        .output()
        .map_err(|e| RouterError::GitError(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RouterError::GitError(format!(
            "git rev-parse {reference} failed: {stderr}"
        )));
    }

    let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if sha.is_empty() {
        return Err(RouterError::GitError(format!(
            "git rev-parse {reference} returned empty output"
        )));
    }

    Ok(sha)
}

/// Maps a tag to a commit hash. A lookup that fails yields `None`.
pub trait CommitResolver {
    fn resolve(&self, reference: &str) -> Option<String>;
}

/// Resolves commits with the `git` binary.
#[derive(Debug, Clone, Default)]
pub struct GitCommitResolver {
    repo_dir: Option<PathBuf>,
}

impl GitCommitResolver {
    /// Resolve inside `repo_dir`, or the current directory when `None`.
    pub fn new(repo_dir: Option<PathBuf>) -> Self {
        Self { repo_dir }
    }
}

impl CommitResolver for GitCommitResolver {
    fn resolve(&self, reference: &str) -> Option<String> {
        let dir = self.repo_dir.as_deref().unwrap_or_else(|| Path::new("."));
        match rev_parse_commit(dir, reference) {
            Ok(sha) => {
                debug!(reference, sha = %sha, "resolved commit");
                Some(sha)
            }
            Err(e) => {
                warn!(reference, error = %e, "commit lookup failed, leaving commit unchanged");
                None
            }
        }
    }
}

/// Resolver returning a fixed answer, for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct StaticCommitResolver(pub Option<String>);

impl CommitResolver for StaticCommitResolver {
    fn resolve(&self, _reference: &str) -> Option<String> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command as StdCommand;

    fn run_git(repo_dir: &Path, args: &[&str]) -> String {
        let output = StdCommand::new("git")
            .args(args)
            .current_dir(repo_dir)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    fn make_tagged_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        run_git(dir.path(), &["init"]);
        run_git(dir.path(), &["config", "user.name", "test-user"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["commit", "--allow-empty", "-m", "initial"]);
        run_git(dir.path(), &["tag", "1.2.3-RC1"]);
        run_git(dir.path(), &["tag", "-a", "2.0.0", "-m", "release"]);
        dir
    }

    #[test]
    fn rev_parse_lightweight_tag() {
        let repo = make_tagged_repo();
        let head = run_git(repo.path(), &["rev-parse", "HEAD"]);
        let sha = rev_parse_commit(repo.path(), "1.2.3-RC1").unwrap();
        assert_eq!(sha, head);
        assert_eq!(sha.len(), 40);
    }

    #[test]
    fn rev_parse_annotated_tag_peels_to_commit() {
        let repo = make_tagged_repo();
        let head = run_git(repo.path(), &["rev-parse", "HEAD"]);
        assert_eq!(rev_parse_commit(repo.path(), "2.0.0").unwrap(), head);
    }

    #[test]
    fn rev_parse_unknown_tag_fails() {
        let repo = make_tagged_repo();
        let err = rev_parse_commit(repo.path(), "9.9.9").unwrap_err();
        assert!(matches!(err, RouterError::GitError(_)));
    }

    #[test]
    fn git_resolver_degrades_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = GitCommitResolver::new(Some(dir.path().to_path_buf()));
        assert_eq!(resolver.resolve("1.2.3"), None);
    }

    #[test]
    fn git_resolver_resolves_in_repo_dir() {
        let repo = make_tagged_repo();
        let resolver = GitCommitResolver::new(Some(repo.path().to_path_buf()));
        assert!(resolver.resolve("1.2.3-RC1").is_some());
    }

    #[test]
    fn static_resolver_returns_fixed_value() {
        let resolver = StaticCommitResolver(Some("abc123".to_string()));
        assert_eq!(resolver.resolve("anything").as_deref(), Some("abc123"));
        assert_eq!(StaticCommitResolver::default().resolve("x"), None);
    }
}
