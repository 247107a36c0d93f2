//! Configuration handling for hook-repo.
//!
//! The configuration lists the hook repositories to use, each pinned to a
//! version, together with the hooks to take from each and any per-hook
//! overrides. It lives in `hook-repo.toml`, found by searching up from the
//! current directory.

use crate::core::error::{Error, Result};
use crate::core::repository::RepositoryDescriptor;
use crate::core::workspace::{validate_version, Workspace};
use crate::manifest::check_pattern;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "hook-repo.toml";

/// Environment variable that makes `run` skip every hook.
pub const SKIP_ENV: &str = "HOOK_REPO_SKIP";

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Workspace directory holding checkouts. Defaults to
    /// [`Workspace::default_root`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<PathBuf>,
    /// Timeout applied to each hook run, e.g. `"5m"`. No timeout if unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    /// Hook repositories, in run order.
    pub repos: Vec<RepositoryDescriptor>,
}

impl Config {
    /// Loads configuration from the default location.
    pub fn load() -> Result<Self> {
        let path = Self::find_config_file()?;
        Self::load_from(&path)
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| Error::io("read config", e))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), repos = config.repos.len(), "loaded configuration");
        Ok(config)
    }

    /// Parses and validates configuration text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::config_parse_with_source("Failed to parse TOML", e))?;

        config.validate()?;

        Ok(config)
    }

    /// Finds the configuration file by searching up the directory tree.
    pub fn find_config_file() -> Result<PathBuf> {
        let cwd = std::env::current_dir().map_err(|e| Error::io("get current dir", e))?;

        let mut current = cwd.as_path();
        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Ok(config_path);
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Err(Error::ConfigNotFound {
            path: cwd.join(CONFIG_FILE_NAME),
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if let Some(timeout) = &self.timeout {
            if humantime::parse_duration(timeout).is_err() {
                return Err(Error::config_invalid(
                    "timeout",
                    format!("Invalid duration: {timeout}"),
                ));
            }
        }

        for (i, repo) in self.repos.iter().enumerate() {
            let field = |name: &str| format!("repos[{i}].{name}");

            if repo.location.trim().is_empty() {
                return Err(Error::config_invalid(field("repo"), "must not be empty"));
            }
            validate_version(&repo.version).map_err(|e| match e {
                Error::ConfigInvalid { message, .. } => Error::config_invalid(field("sha"), message),
                other => other,
            })?;
            if repo.hooks.is_empty() {
                return Err(Error::config_invalid(
                    field("hooks"),
                    "at least one hook is required",
                ));
            }

            for (j, hook) in repo.hooks.iter().enumerate() {
                let hook_field = |name: &str| field(&format!("hooks[{j}].{name}"));
                if hook.id.trim().is_empty() {
                    return Err(Error::config_invalid(hook_field("id"), "must not be empty"));
                }
                for (name, pattern) in [("files", &hook.files), ("exclude", &hook.exclude)] {
                    if let Some(pattern) = pattern {
                        check_pattern(pattern)
                            .map_err(|e| Error::config_invalid(hook_field(name), e))?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Returns the configured hook timeout.
    #[must_use]
    pub fn hook_timeout(&self) -> Option<Duration> {
        self.timeout
            .as_deref()
            .and_then(|t| humantime::parse_duration(t).ok())
    }

    /// Returns the workspace to use.
    pub fn workspace(&self) -> Result<Workspace> {
        match &self.workspace {
            Some(root) => Ok(Workspace::new(root)),
            None => Workspace::default_root().map(Workspace::new),
        }
    }

    /// Returns true if `HOOK_REPO_SKIP=1` is set.
    #[must_use]
    pub fn skip_requested() -> bool {
        std::env::var(SKIP_ENV).ok().as_deref() == Some("1")
    }

    /// Generates a starter configuration.
    #[must_use]
    pub fn sample_toml() -> String {
        r#"# hook-repo configuration
# timeout = "5m"

[[repos]]
repo = "https://github.com/example/hooks.git"
sha = "0123456789abcdef0123456789abcdef01234567"

[[repos.hooks]]
id = "trailing-whitespace"

[[repos.hooks]]
id = "flake8"
args = ["--max-line-length=100"]
"#
        .to_string()
    }
}
