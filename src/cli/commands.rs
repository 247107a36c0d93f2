//! CLI command implementations.

use crate::config::{Config, CONFIG_FILE_NAME, SKIP_ENV};
use crate::core::error::{Error, Result};
use crate::core::git::GitRepo;
use crate::core::runner::Runner;
use crate::manifest::Manifest;
use console::style;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Loads the configuration from `path`, or searches for it.
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Drives `future` to completion on a fresh runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Runtime::new().map_err(|e| Error::Internal {
        message: format!("Failed to create runtime: {e}"),
    })?;
    Ok(runtime.block_on(future))
}

/// Write a starter configuration.
pub fn init(config: Option<&Path>, force: bool) -> Result<ExitCode> {
    let config_path = config.map_or_else(|| PathBuf::from(CONFIG_FILE_NAME), Path::to_path_buf);

    if config_path.exists() && !force {
        eprintln!(
            "{} Configuration already exists: {}",
            style("!").yellow(),
            config_path.display()
        );
        eprintln!("  Use --force to overwrite.");
        return Ok(ExitCode::FAILURE);
    }

    std::fs::write(&config_path, Config::sample_toml()).map_err(|e| Error::io("write config", e))?;

    eprintln!("{} Created {}", style("✓").green(), config_path.display());
    eprintln!("\nNext steps:");
    eprintln!("  1. Point [[repos]] at your hook repositories");
    eprintln!("  2. Run: hook-repo install");

    Ok(ExitCode::SUCCESS)
}

/// Fetch and install every configured repository.
pub fn install(config: Option<&Path>) -> Result<ExitCode> {
    let runner = Runner::new(load_config(config)?)?;
    let count = block_on(runner.install_all())??;

    eprintln!(
        "{} Installed {count} repositor{} into {}",
        style("✓").green().bold(),
        if count == 1 { "y" } else { "ies" },
        runner.workspace().root().display()
    );
    Ok(ExitCode::SUCCESS)
}

/// Run hooks.
pub fn run(
    config: Option<&Path>,
    hook: Option<&str>,
    all_files: bool,
    files: Vec<String>,
) -> Result<ExitCode> {
    if Config::skip_requested() {
        eprintln!("{} Skipping hooks ({SKIP_ENV}=1)", style("•").cyan());
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(config)?;

    let mut runner = Runner::new(config)?;

    // Paths from git are relative to the repository root, so hooks run there
    let files = if files.is_empty() {
        let repo = GitRepo::discover()?;
        runner = runner.with_work_dir(repo.root());
        if all_files {
            repo.all_files()?
        } else {
            repo.staged_files()?
        }
    } else {
        files
    };
    tracing::debug!(files = files.len(), "selected files");

    let result = block_on(runner.run(&files, hook))??;

    eprintln!();
    if result.success() {
        eprintln!(
            "{} All hooks passed ({} passed, {} skipped) in {}",
            style("✓").green().bold(),
            result.passed_count(),
            result.skipped_count(),
            humantime::format_duration(std::time::Duration::from_millis(
                u64::try_from(result.duration.as_millis()).unwrap_or(u64::MAX)
            ))
        );
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!(
            "{} {} hook(s) failed",
            style("✗").red().bold(),
            result.failed_count()
        );

        for hook in result.failed_hooks() {
            eprintln!();
            eprintln!("  {} {} ({})", style("Failed:").red(), hook.name, hook.repo);
            let output = hook.output.combined_output();
            for line in output.lines().take(20) {
                eprintln!("    {line}");
            }
        }

        Ok(ExitCode::FAILURE)
    }
}

/// List the effective hooks of every repository.
pub fn list(config: Option<&Path>, json: bool) -> Result<ExitCode> {
    let runner = Runner::new(load_config(config)?)?;

    let listing = block_on(async {
        let mut listing = Vec::new();
        for mut repo in runner.repositories() {
            let hooks: Vec<_> = repo.hooks().await?.iter().cloned().collect();
            listing.push((repo.location().to_string(), repo.version().to_string(), hooks));
        }
        Ok::<_, Error>(listing)
    })??;

    if json {
        let value: Vec<_> = listing
            .iter()
            .map(|(repo, sha, hooks)| serde_json::json!({ "repo": repo, "sha": sha, "hooks": hooks }))
            .collect();
        let text = serde_json::to_string_pretty(&value).map_err(|e| Error::Internal {
            message: format!("Failed to serialize hooks: {e}"),
        })?;
        println!("{text}");
        return Ok(ExitCode::SUCCESS);
    }

    for (repo, sha, hooks) in &listing {
        eprintln!("{} {}", style(repo).bold(), style(format!("@ {sha}")).dim());
        for hook in hooks {
            let description = hook
                .description
                .as_deref()
                .filter(|d| !d.is_empty())
                .unwrap_or("(no description)");
            eprintln!(
                "  {} [{}] - {}",
                style(&hook.id).cyan(),
                hook.language,
                description
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Validate configuration.
pub fn validate(config: Option<&Path>) -> Result<ExitCode> {
    match load_config(config) {
        Ok(config) => {
            eprintln!(
                "{} Configuration is valid ({} repositories)",
                style("✓").green(),
                config.repos.len()
            );
            Ok(ExitCode::SUCCESS)
        },
        Err(Error::ConfigNotFound { path }) => {
            eprintln!(
                "{} Configuration not found: {}",
                style("!").yellow(),
                path.display()
            );
            eprintln!("  Run: hook-repo init");
            Ok(ExitCode::FAILURE)
        },
        Err(e) => {
            eprintln!("{} Configuration validation failed: {e}", style("✗").red());
            Ok(ExitCode::FAILURE)
        },
    }
}

/// Validate a hook manifest.
pub fn validate_manifest(path: &Path) -> Result<ExitCode> {
    match Manifest::load(path) {
        Ok(manifest) => {
            eprintln!(
                "{} {} is valid ({} hooks: {})",
                style("✓").green(),
                path.display(),
                manifest.len(),
                manifest.ids().join(", ")
            );
            Ok(ExitCode::SUCCESS)
        },
        Err(e) => {
            eprintln!("{} {e}", style("✗").red());
            Ok(ExitCode::FAILURE)
        },
    }
}

/// Remove the workspace.
pub fn clean(config: Option<&Path>, yes: bool) -> Result<ExitCode> {
    // A missing config still has a default workspace to clean
    let config = match load_config(config) {
        Ok(config) => config,
        Err(Error::ConfigNotFound { .. }) => Config::default(),
        Err(e) => return Err(e),
    };
    let workspace = config.workspace()?;

    if !yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Remove {}?", workspace.root().display()))
            .default(false)
            .interact()
            .map_err(|e| Error::Internal {
                message: format!("Failed to read confirmation: {e}"),
            })?;
        if !confirmed {
            eprintln!("{} Aborted", style("•").cyan());
            return Ok(ExitCode::FAILURE);
        }
    }

    if workspace.clean()? {
        eprintln!(
            "{} Removed {}",
            style("✓").green(),
            workspace.root().display()
        );
    } else {
        eprintln!(
            "{} Nothing to clean at {}",
            style("•").cyan(),
            workspace.root().display()
        );
    }
    Ok(ExitCode::SUCCESS)
}

/// Generate shell completions.
pub fn completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    clap_complete::generate(
        shell,
        &mut super::Cli::command(),
        "hook-repo",
        &mut std::io::stdout(),
    );
}
