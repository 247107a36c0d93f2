//! Hook runner across every configured repository.
//!
//! This module drives [`Repository`] instances for a whole configuration:
//! it installs them, selects the files each hook applies to and collects
//! the results.

// Allow this for Rust 2024 compatibility - the drop order change is harmless here
#![allow(tail_expr_drop_order)]

use crate::config::Config;
use crate::core::command::CommandRunner;
use crate::core::error::{Error, Result};
use crate::core::executor::{CommandOutput, ExecuteOptions};
use crate::core::git::{Fetcher, GitFetcher};
use crate::core::repository::Repository;
use crate::core::workspace::Workspace;
use crate::languages::LanguageRegistry;
use crate::manifest::Hook;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Result of running a single hook.
#[derive(Debug, Clone)]
pub struct HookResult {
    /// Location of the repository the hook comes from.
    pub repo: String,
    /// Id of the hook.
    pub id: String,
    /// Display name of the hook.
    pub name: String,
    /// Whether the hook passed.
    pub passed: bool,
    /// Output from the hook.
    pub output: CommandOutput,
    /// Whether the hook was skipped.
    pub skipped: bool,
    /// Reason for skipping (if skipped).
    pub skip_reason: Option<String>,
}

impl HookResult {
    /// Creates a skipped hook result.
    fn skipped(repo: &str, hook: &Hook, reason: impl Into<String>) -> Self {
        Self {
            repo: repo.to_string(),
            id: hook.id.clone(),
            name: hook.display_name().to_string(),
            passed: true, // Skipped hooks don't fail
            output: CommandOutput::new(0, "", ""),
            skipped: true,
            skip_reason: Some(reason.into()),
        }
    }

    fn completed(repo: &str, hook: &Hook, output: CommandOutput) -> Self {
        Self {
            repo: repo.to_string(),
            id: hook.id.clone(),
            name: hook.display_name().to_string(),
            passed: output.success(),
            output,
            skipped: false,
            skip_reason: None,
        }
    }
}

/// Result of running all hooks.
#[derive(Debug, Default)]
pub struct RunResult {
    /// Individual hook results.
    pub hooks: Vec<HookResult>,
    /// Total duration.
    pub duration: Duration,
}

impl RunResult {
    /// Returns true if all hooks passed.
    #[must_use]
    pub fn success(&self) -> bool {
        self.hooks.iter().all(|h| h.passed)
    }

    /// Returns the number of passed hooks.
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.hooks.iter().filter(|h| h.passed && !h.skipped).count()
    }

    /// Returns the number of failed hooks.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.hooks.iter().filter(|h| !h.passed).count()
    }

    /// Returns the number of skipped hooks.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.hooks.iter().filter(|h| h.skipped).count()
    }

    /// Returns failed hook results.
    pub fn failed_hooks(&self) -> impl Iterator<Item = &HookResult> {
        self.hooks.iter().filter(|h| !h.passed)
    }
}

/// Runner for executing the hooks of every configured repository.
#[derive(Debug)]
pub struct Runner {
    config: Config,
    workspace: Workspace,
    fetcher: Arc<dyn Fetcher>,
    registry: Arc<LanguageRegistry>,
    work_dir: Option<PathBuf>,
}

impl Runner {
    /// Creates a runner using git and the built-in languages.
    pub fn new(config: Config) -> Result<Self> {
        let workspace = config.workspace()?;
        Ok(Self::with_parts(
            config,
            workspace,
            Arc::new(GitFetcher::new()),
            Arc::new(LanguageRegistry::with_defaults()),
        ))
    }

    /// Creates a runner from explicit collaborators.
    #[must_use]
    pub fn with_parts(
        config: Config,
        workspace: Workspace,
        fetcher: Arc<dyn Fetcher>,
        registry: Arc<LanguageRegistry>,
    ) -> Self {
        Self {
            config,
            workspace,
            fetcher,
            registry,
            work_dir: None,
        }
    }

    /// Runs hooks from `dir` instead of the caller's working directory.
    ///
    /// File paths given to [`run`](Self::run) must be relative to `dir`.
    #[must_use]
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    /// Returns the workspace.
    #[must_use]
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Builds one repository per configured descriptor.
    #[must_use]
    pub fn repositories(&self) -> Vec<Repository> {
        self.config
            .repos
            .iter()
            .map(|descriptor| {
                Repository::new(
                    descriptor.clone(),
                    self.workspace.clone(),
                    Arc::clone(&self.fetcher),
                    Arc::clone(&self.registry),
                )
            })
            .collect()
    }

    /// Returns a runner bound to the workspace root, used for fetching and
    /// installing.
    #[must_use]
    pub fn command_runner(&self) -> CommandRunner {
        self.workspace.command_runner()
    }

    /// Returns a runner bound to the workspace root for hook runs: the
    /// configured timeout applies and commands start in the work directory.
    #[must_use]
    pub fn hook_runner(&self) -> CommandRunner {
        let mut options = ExecuteOptions::default();
        if let Some(timeout) = self.config.hook_timeout() {
            options = options.timeout(timeout);
        }
        if let Some(dir) = &self.work_dir {
            options = options.cwd(dir);
        }
        self.workspace.command_runner().with_options(options)
    }

    /// Fetches and installs every repository. Returns how many there are.
    pub async fn install_all(&self) -> Result<usize> {
        let runner = self.command_runner();
        let mut repositories = self.repositories();
        for repo in &mut repositories {
            let pb = spinner(format!("Installing {}...", repo.location()));
            let installed = repo.install(&runner).await;
            pb.finish_and_clear();
            installed?;
            eprintln!("{} {}", style("✓").green(), repo.location());
        }
        Ok(repositories.len())
    }

    /// Runs hooks against `files`. With `only`, runs just that hook id.
    pub async fn run(&self, files: &[String], only: Option<&str>) -> Result<RunResult> {
        let start = std::time::Instant::now();
        let install_runner = self.command_runner();
        let hook_runner = self.hook_runner();
        let mut results = Vec::new();
        let mut found = only.is_none();

        for mut repo in self.repositories() {
            let hooks: Vec<Hook> = repo
                .hooks()
                .await?
                .iter()
                .filter(|h| only.map_or(true, |id| h.id == id))
                .cloned()
                .collect();

            for hook in hooks {
                found = true;
                let selected = filter_files(&hook, files)?;
                if selected.is_empty() {
                    eprintln!(
                        "{} {} (no files to check)",
                        style("-").dim(),
                        hook.display_name()
                    );
                    results.push(HookResult::skipped(
                        repo.location(),
                        &hook,
                        "no files to check",
                    ));
                    continue;
                }

                let pb = spinner(format!("Running {}...", hook.display_name()));
                let output = async {
                    repo.require_installed(&install_runner).await?;
                    repo.run_hook(&hook_runner, &hook.id, &selected).await
                }
                .await;
                pb.finish_and_clear();
                let output = output?;

                if output.success() {
                    eprintln!("{} {}", style("✓").green(), hook.display_name());
                } else if output.timed_out {
                    eprintln!("{} {} (timed out)", style("✗").red(), hook.display_name());
                } else {
                    eprintln!("{} {}", style("✗").red(), hook.display_name());
                }

                results.push(HookResult::completed(repo.location(), &hook, output));
            }
        }

        if !found {
            if let Some(id) = only {
                return Err(Error::HookNotFound { id: id.to_string() });
            }
        }

        Ok(RunResult {
            hooks: results,
            duration: start.elapsed(),
        })
    }
}

/// Selects the files `hook` applies to: matching `files` and not `exclude`.
pub fn filter_files(hook: &Hook, files: &[String]) -> Result<Vec<String>> {
    let include = compile(&hook.id, "files", &hook.files)?;
    let exclude = hook
        .exclude
        .as_deref()
        .map(|pattern| compile(&hook.id, "exclude", pattern))
        .transpose()?;

    Ok(files
        .iter()
        .filter(|f| include.is_match(f))
        .filter(|f| exclude.as_ref().map_or(true, |re| !re.is_match(f)))
        .cloned()
        .collect())
}

fn compile(id: &str, field: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::config_invalid(format!("{id}.{field}"), e.to_string()))
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .ok()
            .unwrap_or_else(ProgressStyle::default_spinner),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
