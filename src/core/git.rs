//! Git operations.
//!
//! Two sides of git live here: [`GitRepo`], the project whose files hooks
//! are run against, and [`Fetcher`]/[`GitFetcher`], which materialize hook
//! repositories into the workspace.

use crate::core::error::{Error, Result};
use crate::core::executor::{ExecuteOptions, Executor};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Represents the Git repository hooks are run against.
#[derive(Debug, Clone)]
pub struct GitRepo {
    /// Root directory of the repository (where .git is).
    root: PathBuf,
}

impl GitRepo {
    /// Discovers the Git repository from the current directory.
    pub fn discover() -> Result<Self> {
        Self::discover_from(&std::env::current_dir().map_err(|e| Error::io("get current dir", e))?)
    }

    /// Discovers the Git repository from a specific path.
    pub fn discover_from(path: &Path) -> Result<Self> {
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(path)
            .output()
            .map_err(|e| Error::io("run git rev-parse", e))?;

        if !output.status.success() {
            return Err(Error::NotGitRepo);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let root = stdout
            .lines()
            .next()
            .map(PathBuf::from)
            .ok_or(Error::NotGitRepo)?;

        Ok(Self { root })
    }

    /// Returns the root directory of the repository.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the staged files, relative to the repository root.
    pub fn staged_files(&self) -> Result<Vec<String>> {
        self.list(
            &["diff", "--cached", "--name-only", "--diff-filter=ACMR"],
            "diff --cached",
        )
    }

    /// Returns every tracked file, relative to the repository root.
    pub fn all_files(&self) -> Result<Vec<String>> {
        self.list(&["ls-files"], "ls-files")
    }

    fn list(&self, args: &[&str], operation: &str) -> Result<Vec<String>> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| Error::io(format!("run git {operation}"), e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::git(operation, stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// Version-control operations needed to materialize a hook repository.
///
/// Both operations fail loudly and must not leave a directory that looks
/// complete after a failure.
#[async_trait]
pub trait Fetcher: Send + Sync + std::fmt::Debug {
    /// Clones `location` into `dest` without checking out any content.
    async fn clone_no_checkout(&self, location: &str, dest: &Path) -> Result<()>;

    /// Checks out `version` inside the clone at `checkout_dir`.
    async fn checkout(&self, checkout_dir: &Path, version: &str) -> Result<()>;
}

/// [`Fetcher`] backed by the `git` executable.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitFetcher {
    executor: Executor,
}

impl GitFetcher {
    /// Creates a new git fetcher.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            executor: Executor::new(),
        }
    }

    fn require_git() -> Result<()> {
        if Executor::command_exists("git") {
            Ok(())
        } else {
            Err(Error::CommandNotFound {
                command: "git".to_string(),
            })
        }
    }
}

#[async_trait]
impl Fetcher for GitFetcher {
    async fn clone_no_checkout(&self, location: &str, dest: &Path) -> Result<()> {
        Self::require_git()?;
        let args = vec![
            "clone".to_string(),
            "--no-checkout".to_string(),
            location.to_string(),
            dest.to_string_lossy().into_owned(),
        ];
        let output = self
            .executor
            .execute("git", &args, &ExecuteOptions::default())
            .await?;

        if !output.success() {
            return Err(Error::clone_failed(
                location,
                output.combined_output().trim().to_string(),
            ));
        }
        Ok(())
    }

    async fn checkout(&self, checkout_dir: &Path, version: &str) -> Result<()> {
        Self::require_git()?;
        let args = vec!["checkout".to_string(), version.to_string()];
        let output = self
            .executor
            .execute("git", &args, &ExecuteOptions::default().cwd(checkout_dir))
            .await?;

        if !output.success() {
            return Err(Error::fetch(
                checkout_dir.display().to_string(),
                version,
                output.combined_output().trim().to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn git(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .expect("run git");
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    fn create_test_repo() -> (TempDir, GitRepo) {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path();

        git(path, &["init"]);
        git(path, &["config", "user.email", "test@test.com"]);
        git(path, &["config", "user.name", "Test"]);

        let repo = GitRepo::discover_from(path).expect("discover repo");
        (temp, repo)
    }

    fn commit_file(dir: &Path, name: &str, content: &str) -> String {
        std::fs::write(dir.join(name), content).expect("write file");
        git(dir, &["add", name]);
        git(dir, &["commit", "-m", name]);
        git(dir, &["rev-parse", "HEAD"])
    }

    // =========================================================================
    // Discovery tests
    // =========================================================================

    #[test]
    fn test_discover_repo() {
        let (temp, repo) = create_test_repo();
        // Canonicalize both paths to handle macOS /var -> /private/var symlinks
        let expected = temp.path().canonicalize().expect("canonicalize temp");
        let actual = repo.root().canonicalize().expect("canonicalize root");
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_discover_from_subdirectory() {
        let (temp, _) = create_test_repo();
        let subdir = temp.path().join("src/lib");
        std::fs::create_dir_all(&subdir).expect("create subdir");

        let repo = GitRepo::discover_from(&subdir).expect("discover from subdir");
        let expected = temp.path().canonicalize().expect("canonicalize temp");
        let actual = repo.root().canonicalize().expect("canonicalize root");
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_not_git_repo() {
        let temp = TempDir::new().expect("create temp dir");
        let result = GitRepo::discover_from(temp.path());
        assert!(matches!(result, Err(Error::NotGitRepo)));
    }

    // =========================================================================
    // File listing tests
    // =========================================================================

    #[test]
    fn test_staged_files_empty() {
        let (_temp, repo) = create_test_repo();
        assert!(repo.staged_files().expect("get staged files").is_empty());
    }

    #[test]
    fn test_staged_files_with_file() {
        let (temp, repo) = create_test_repo();
        std::fs::write(temp.path().join("new_file.txt"), "content").expect("write file");
        git(temp.path(), &["add", "new_file.txt"]);

        let staged = repo.staged_files().expect("get staged files");
        assert_eq!(staged, vec!["new_file.txt".to_string()]);
    }

    #[test]
    fn test_all_files_lists_tracked_only() {
        let (temp, repo) = create_test_repo();
        commit_file(temp.path(), "tracked.txt", "x");
        std::fs::write(temp.path().join("untracked.txt"), "y").expect("write file");

        let files = repo.all_files().expect("list files");
        assert_eq!(files, vec!["tracked.txt".to_string()]);
    }

    // =========================================================================
    // Fetcher tests
    // =========================================================================

    #[tokio::test]
    async fn test_git_fetcher_clones_and_checks_out_version() {
        let (source, _) = create_test_repo();
        let first = commit_file(source.path(), "hooks.yaml", "- first\n");
        commit_file(source.path(), "hooks.yaml", "- second\n");

        let store = TempDir::new().expect("create store");
        let dest = store.path().join(&first);
        let fetcher = GitFetcher::new();

        fetcher
            .clone_no_checkout(&source.path().to_string_lossy(), &dest)
            .await
            .expect("clone");
        assert!(!dest.join("hooks.yaml").exists());

        fetcher.checkout(&dest, &first).await.expect("checkout");
        let content = std::fs::read_to_string(dest.join("hooks.yaml")).expect("read manifest");
        assert_eq!(content, "- first\n");
    }

    #[tokio::test]
    async fn test_git_fetcher_clone_failure() {
        let store = TempDir::new().expect("create store");
        let missing = store.path().join("no-such-repo");
        let result = GitFetcher::new()
            .clone_no_checkout(&missing.to_string_lossy(), &store.path().join("dest"))
            .await;

        let err = result.expect_err("clone of a missing repository");
        assert!(matches!(err, Error::CloneFailed { ref location, .. } if location.ends_with("no-such-repo")));
        assert!(!err.to_string().contains("(clone)"));
    }

    #[tokio::test]
    async fn test_git_fetcher_unknown_version() {
        let (source, _) = create_test_repo();
        commit_file(source.path(), "hooks.yaml", "[]\n");
        let store = TempDir::new().expect("create store");
        let dest = store.path().join("deadbeef");
        let fetcher = GitFetcher::new();

        fetcher
            .clone_no_checkout(&source.path().to_string_lossy(), &dest)
            .await
            .expect("clone");
        let result = fetcher.checkout(&dest, "deadbeef").await;

        assert!(matches!(result, Err(Error::Fetch { version, .. }) if version == "deadbeef"));
    }
}
