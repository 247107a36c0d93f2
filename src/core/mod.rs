//! Core functionality for hook-repo.
//!
//! This module contains the main components:
//! - [`repository`]: Lifecycle of one pinned hook repository
//! - [`runner`]: Runs the hooks of every configured repository
//! - [`workspace`]: Shared on-disk store of checkouts
//! - [`command`]: Commands bound to a checkout prefix
//! - [`executor`]: Subprocess execution
//! - [`git`]: Git operations and fetching
//! - [`error`]: Error types and result handling

pub mod command;
pub mod error;
pub mod executor;
pub mod git;
pub mod repository;
pub mod runner;
pub mod workspace;
