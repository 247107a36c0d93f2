//! Command-line interface for hook-repo.
//!
//! This module provides the `hook-repo` CLI with subcommands for:
//! - `run`: Run configured hooks against files
//! - `install`: Fetch and install every hook repository
//! - `list`: List effective hooks
//! - `validate`: Validate configuration
//! - `validate-manifest`: Validate a hook manifest
//! - `init`: Write a starter configuration
//! - `clean`: Remove the hook workspace

mod commands;

use crate::core::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Fetch, install and run hooks from pinned hook repositories.
#[derive(Debug, Parser)]
#[command(
    name = "hook-repo",
    author,
    version,
    about = "Fetch, install and run hooks from pinned hook repositories",
    long_about = r#"
hook-repo runs checks ("hooks") published in git repositories.

Each repository is pinned to a version in hook-repo.toml. The first time a
version is used it is cloned into a shared workspace and the environments
its hooks need are installed; later runs reuse both.

Quick start:
  hook-repo init       # Create hook-repo.toml
  hook-repo install    # Fetch repositories and install environments
  hook-repo run        # Run hooks against staged files

Environment variables:
  HOOK_REPO_HOME=DIR   Workspace directory
  HOOK_REPO_SKIP=1     Skip all hooks
"#,
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to the configuration file.
    #[arg(short, long, global = true, env = "HOOK_REPO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use color output.
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,
}

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Always use color.
    Always,
    /// Auto-detect color support.
    #[default]
    Auto,
    /// Never use color.
    Never,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run hooks against files (staged files by default).
    #[command(visible_alias = "r")]
    Run {
        /// Run only the hook with this id.
        #[arg(long)]
        hook: Option<String>,

        /// Run against every tracked file.
        #[arg(short, long, conflicts_with = "files")]
        all_files: bool,

        /// Files to check.
        files: Vec<String>,
    },

    /// Fetch every hook repository and install its environments.
    Install,

    /// List the effective hooks of every repository.
    #[command(visible_alias = "l")]
    List {
        /// Output JSON.
        #[arg(long)]
        json: bool,
    },

    /// Validate the configuration file.
    #[command(visible_alias = "v")]
    Validate,

    /// Validate a hook manifest file.
    ValidateManifest {
        /// Manifest to validate.
        #[arg(default_value = crate::manifest::MANIFEST_FILE)]
        path: PathBuf,
    },

    /// Write a starter configuration file.
    Init {
        /// Overwrite existing configuration.
        #[arg(short, long)]
        force: bool,
    },

    /// Remove the workspace with every checkout and environment.
    Clean {
        /// Do not ask for confirmation.
        #[arg(short, long)]
        yes: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Runs the CLI.
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);
    setup_color(cli.color);

    let config = cli.config.as_deref();

    // If no subcommand, run the default action (same as `hook-repo run`)
    match cli.command {
        Some(Commands::Run {
            hook,
            all_files,
            files,
        }) => commands::run(config, hook.as_deref(), all_files, files),
        Some(Commands::Install) => commands::install(config),
        Some(Commands::List { json }) => commands::list(config, json),
        Some(Commands::Validate) => commands::validate(config),
        Some(Commands::ValidateManifest { path }) => commands::validate_manifest(&path),
        Some(Commands::Init { force }) => commands::init(config, force),
        Some(Commands::Clean { yes }) => commands::clean(config, yes),
        Some(Commands::Completions { shell }) => {
            commands::completions(shell);
            Ok(ExitCode::SUCCESS)
        },
        None => commands::run(config, None, false, Vec::new()),
    }
}

/// Sets up logging based on verbosity flags.
fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Sets up color output.
fn setup_color(choice: ColorChoice) {
    match choice {
        ColorChoice::Always => {
            console::set_colors_enabled(true);
            console::set_colors_enabled_stderr(true);
        },
        ColorChoice::Never => {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        },
        ColorChoice::Auto => {
            // Let console crate auto-detect
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_help() {
        // --help causes early exit, so this will be an error
        assert!(Cli::try_parse_from(["hook-repo", "--help"]).is_err());
    }

    #[test]
    fn test_parse_no_subcommand() {
        let cli = Cli::try_parse_from(["hook-repo"]).expect("parse");
        assert!(cli.command.is_none());
        assert_eq!(cli.color, ColorChoice::Auto);
    }

    #[test]
    fn test_parse_run_with_files() {
        let cli = Cli::try_parse_from(["hook-repo", "run", "a.txt", "b.txt"]).expect("parse");
        match cli.command {
            Some(Commands::Run {
                hook,
                all_files,
                files,
            }) => {
                assert!(hook.is_none());
                assert!(!all_files);
                assert_eq!(files, vec!["a.txt".to_string(), "b.txt".to_string()]);
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_run_single_hook_all_files() {
        let cli = Cli::try_parse_from(["hook-repo", "r", "--hook", "lint", "--all-files"])
            .expect("parse");
        assert!(matches!(
            cli.command,
            Some(Commands::Run { hook: Some(ref h), all_files: true, .. }) if h == "lint"
        ));
    }

    #[test]
    fn test_all_files_conflicts_with_files() {
        assert!(Cli::try_parse_from(["hook-repo", "run", "--all-files", "a.txt"]).is_err());
    }

    #[test]
    fn test_parse_install() {
        let cli = Cli::try_parse_from(["hook-repo", "install"]).expect("parse");
        assert!(matches!(cli.command, Some(Commands::Install)));
    }

    #[test]
    fn test_parse_list_json() {
        let cli = Cli::try_parse_from(["hook-repo", "list", "--json"]).expect("parse");
        assert!(matches!(cli.command, Some(Commands::List { json: true })));
    }

    #[test]
    fn test_parse_validate_manifest_default_path() {
        let cli = Cli::try_parse_from(["hook-repo", "validate-manifest"]).expect("parse");
        assert!(matches!(
            cli.command,
            Some(Commands::ValidateManifest { ref path }) if path == &PathBuf::from("hooks.yaml")
        ));
    }

    #[test]
    fn test_parse_clean_yes() {
        let cli = Cli::try_parse_from(["hook-repo", "clean", "-y"]).expect("parse");
        assert!(matches!(cli.command, Some(Commands::Clean { yes: true })));
    }

    #[test]
    fn test_parse_global_config() {
        let cli = Cli::try_parse_from(["hook-repo", "validate", "--config", "other.toml"])
            .expect("parse");
        assert_eq!(cli.config, Some(PathBuf::from("other.toml")));
    }

    #[test]
    fn test_parse_invalid_color() {
        assert!(Cli::try_parse_from(["hook-repo", "--color", "rainbow"]).is_err());
    }
}
