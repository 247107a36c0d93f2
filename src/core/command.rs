//! Prefix-bound command runner.
//!
//! A [`CommandRunner`] knows *where* commands for a hook repository should
//! run. A `{prefix}` in the program path (or in a shell script) is replaced
//! with the bound directory, always ending in a path separator, so backends
//! can refer to files inside a checkout without knowing where the workspace
//! lives. Arguments are passed through untouched.

use crate::core::error::{Error, Result};
use crate::core::executor::{CommandOutput, ExecuteOptions, Executor};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// Placeholder substituted with the runner's prefix directory.
pub const PREFIX_PLACEHOLDER: &str = "{prefix}";

/// Runs commands relative to a prefix directory.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    prefix_dir: PathBuf,
    executor: Executor,
    options: ExecuteOptions,
}

impl CommandRunner {
    /// Creates a runner bound to `prefix_dir`.
    #[must_use]
    pub fn new(prefix_dir: impl Into<PathBuf>) -> Self {
        Self {
            prefix_dir: prefix_dir.into(),
            executor: Executor::new(),
            options: ExecuteOptions::default(),
        }
    }

    /// Replaces the base execution options (timeout, environment).
    #[must_use]
    pub fn with_options(mut self, options: ExecuteOptions) -> Self {
        self.options = options;
        self
    }

    /// Derives a runner whose prefix is `sub` inside this runner's prefix.
    ///
    /// Does not touch the filesystem.
    #[must_use]
    pub fn scoped(&self, sub: impl AsRef<Path>) -> Self {
        Self {
            prefix_dir: self.prefix_dir.join(sub),
            executor: self.executor,
            options: self.options.clone(),
        }
    }

    /// Returns the bound prefix directory.
    #[must_use]
    pub fn prefix_dir(&self) -> &Path {
        &self.prefix_dir
    }

    /// Returns `rel` resolved against the prefix directory.
    #[must_use]
    pub fn path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.prefix_dir.join(rel)
    }

    /// Returns true if `rel` exists inside the prefix directory.
    #[must_use]
    pub fn exists(&self, rel: impl AsRef<Path>) -> bool {
        self.path(rel).exists()
    }

    /// Replaces every `{prefix}` in `arg` with the prefix directory.
    #[must_use]
    pub fn substitute(&self, arg: &str) -> String {
        if !arg.contains(PREFIX_PLACEHOLDER) {
            return arg.to_string();
        }
        let mut prefix = self.prefix_dir.to_string_lossy().into_owned();
        if !prefix.ends_with(MAIN_SEPARATOR) {
            prefix.push(MAIN_SEPARATOR);
        }
        arg.replace(PREFIX_PLACEHOLDER, &prefix)
    }

    /// Runs `argv` from the configured working directory, or the caller's
    /// if none is set.
    pub async fn run(&self, argv: &[String]) -> Result<CommandOutput> {
        self.run_with(argv, self.options.clone()).await
    }

    /// Runs `argv` with the prefix directory as working directory.
    pub async fn run_in_prefix(&self, argv: &[String]) -> Result<CommandOutput> {
        let options = self.options.clone().cwd(&self.prefix_dir);
        self.run_with(argv, options).await
    }

    /// Runs a shell `script` with `arg0` as `$0` and `positional` as `"$@"`.
    ///
    /// Only the script undergoes `{prefix}` substitution; positional
    /// arguments are passed through untouched.
    pub async fn run_shell(
        &self,
        script: &str,
        arg0: &str,
        positional: &[String],
    ) -> Result<CommandOutput> {
        self.executor
            .execute_shell(&self.substitute(script), arg0, positional, &self.options)
            .await
    }

    async fn run_with(&self, argv: &[String], options: ExecuteOptions) -> Result<CommandOutput> {
        let Some((program, args)) = argv.split_first() else {
            return Err(Error::Internal {
                message: "empty command line".to_string(),
            });
        };
        let program = self.substitute(program);
        self.executor.execute(&program, args, &options).await
    }
}
