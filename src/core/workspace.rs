//! Shared hook workspace.
//!
//! All hook repository checkouts live below one workspace root, one
//! directory per version pin. The workspace is passed around as an explicit
//! handle; nothing here changes the process working directory.

use crate::core::command::CommandRunner;
use crate::core::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Environment variable overriding the default workspace location.
pub const WORKSPACE_ENV: &str = "HOOK_REPO_HOME";

/// Directory name used below the user's cache directory.
const WORKSPACE_DIR_NAME: &str = "hook-repo";

/// Handle to the directory holding every hook repository checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Creates a workspace rooted at `root`. The directory is created lazily.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the default workspace root.
    ///
    /// `$HOOK_REPO_HOME` wins, then `<cache dir>/hook-repo`, then
    /// `~/.hook-repo`.
    pub fn default_root() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(WORKSPACE_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        if let Some(cache) = dirs::cache_dir() {
            return Ok(cache.join(WORKSPACE_DIR_NAME));
        }
        dirs::home_dir()
            .map(|home| home.join(format!(".{WORKSPACE_DIR_NAME}")))
            .ok_or_else(|| Error::config_invalid("workspace", "cannot determine home directory"))
    }

    /// Returns the workspace root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the workspace root if needed.
    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| Error::io("create workspace", e))
    }

    /// Returns the checkout directory for `version`.
    #[must_use]
    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.root.join(version)
    }

    /// Returns a command runner bound to the workspace root.
    #[must_use]
    pub fn command_runner(&self) -> CommandRunner {
        CommandRunner::new(&self.root)
    }

    /// Runs `f` with the checkout directory of `version` after making sure
    /// the workspace root exists.
    pub fn in_version_dir<T>(&self, version: &str, f: impl FnOnce(&Path) -> Result<T>) -> Result<T> {
        self.ensure()?;
        f(&self.version_dir(version))
    }

    /// Removes the whole workspace. Returns false if it did not exist.
    pub fn clean(&self) -> Result<bool> {
        if !self.root.exists() {
            return Ok(false);
        }
        std::fs::remove_dir_all(&self.root).map_err(|e| Error::io("remove workspace", e))?;
        Ok(true)
    }
}

/// Checks that `version` can be used as a single directory name.
pub fn validate_version(version: &str) -> Result<()> {
    let mut components = Path::new(version).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !version.contains(['/', '\\']) => Ok(()),
        _ => Err(Error::config_invalid(
            "sha",
            format!("'{version}' is not usable as a version directory name"),
        )),
    }
}

/// Removes a path when dropped unless [`commit`](Self::commit) was called.
///
/// Used around fetches so a failed clone never leaves a directory that a
/// later existence check would take for a complete checkout.
#[derive(Debug)]
pub struct CleanOnFailure {
    path: PathBuf,
    armed: bool,
}

impl CleanOnFailure {
    /// Registers `path` for removal.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            armed: true,
        }
    }

    /// Returns the guarded path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keeps the path.
    pub fn commit(mut self) {
        self.armed = false;
    }
}

impl Drop for CleanOnFailure {
    fn drop(&mut self) {
        if !self.armed || !self.path.exists() {
            return;
        }
        let removed = if self.path.is_dir() {
            std::fs::remove_dir_all(&self.path)
        } else {
            std::fs::remove_file(&self.path)
        };
        match removed {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed partial checkout"),
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove partial checkout"
            ),
        }
    }
}
