//! # hook-repo
//!
//! Fetch, install and run hooks published in git repositories.
//!
//! A hook repository is a git repository with a `hooks.yaml` manifest at its
//! root. Projects pin each repository to a version in `hook-repo.toml` and
//! choose which of its hooks to run. The first use of a version clones it
//! into a shared workspace and installs the language environments its hooks
//! need; later runs reuse both.
//!
//! ## Features
//!
//! - **Lazy lifecycle**: a [`Repository`] is fetched, parsed and installed
//!   only when something asks for it, and each step happens at most once
//! - **Crash-safe fetches**: a failed clone never leaves a half-populated
//!   version directory behind
//! - **Language backends**: python, node, script and system hooks through a
//!   pluggable [`LanguageRegistry`]
//! - **Overrides**: per-project args, file patterns and names layered over
//!   the manifest
//!
//! ## Example
//!
//! ```rust,no_run
//! use hook_repo::{Config, Runner};
//!
//! #[tokio::main]
//! async fn main() -> hook_repo::Result<()> {
//!     let config = Config::load()?;
//!     let runner = Runner::new(config)?;
//!
//!     let files = vec!["src/main.py".to_string()];
//!     let result = runner.run(&files, None).await?;
//!
//!     if result.success() {
//!         Ok(())
//!     } else {
//!         std::process::exit(1);
//!     }
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/hook-repo/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod cli;
pub mod config;
pub mod core;
pub mod languages;
pub mod manifest;

// Re-export main types for convenience
pub use config::Config;
pub use core::command::CommandRunner;
pub use core::error::{Error, Result};
pub use core::repository::{Repository, RepositoryDescriptor};
pub use core::runner::{HookResult, RunResult, Runner};
pub use core::workspace::Workspace;
pub use languages::{Language, LanguageRegistry};
pub use manifest::{Hook, HookOverride, Manifest};
