//! Hook repository lifecycle.
//!
//! A [`Repository`] moves strictly forward through
//! `Uncreated -> Created -> Installed`. Every transition is checked against
//! durable state in the workspace first (an existing checkout directory, an
//! existing environment marker), so a fresh process rediscovers work done by
//! earlier ones instead of redoing it. Derived values (manifest, effective
//! hooks, languages) are computed on first use and kept for the lifetime of
//! the instance.

use crate::core::command::CommandRunner;
use crate::core::error::{Error, Result};
use crate::core::executor::CommandOutput;
use crate::core::git::Fetcher;
use crate::core::workspace::{CleanOnFailure, Workspace};
use crate::languages::LanguageRegistry;
use crate::manifest::{HookOverride, HookSet, Manifest, MANIFEST_FILE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Where hooks come from and which of them to use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    /// Remote location of the hook repository.
    #[serde(rename = "repo")]
    pub location: String,
    /// Version pin. Also names the checkout directory in the workspace.
    #[serde(rename = "sha")]
    pub version: String,
    /// Hooks to use, with per-hook overrides, in run order.
    #[serde(default)]
    pub hooks: Vec<HookOverride>,
}

impl RepositoryDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(
        location: impl Into<String>,
        version: impl Into<String>,
        hooks: Vec<HookOverride>,
    ) -> Self {
        Self {
            location: location.into(),
            version: version.into(),
            hooks,
        }
    }
}

/// Lifecycle state of a [`Repository`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Lifecycle {
    /// Nothing is known to be on disk yet.
    Uncreated,
    /// The pinned version is checked out in the workspace.
    Created,
    /// Every language environment the hooks need is installed.
    Installed,
}

/// A hook repository bound to a workspace.
#[derive(Debug)]
pub struct Repository {
    descriptor: RepositoryDescriptor,
    workspace: Workspace,
    fetcher: Arc<dyn Fetcher>,
    registry: Arc<LanguageRegistry>,
    state: Lifecycle,
    manifest: Option<Manifest>,
    hooks: Option<HookSet>,
    languages: Option<BTreeSet<String>>,
}

impl Repository {
    /// Creates a repository. Nothing touches the filesystem until first use.
    #[must_use]
    pub fn new(
        descriptor: RepositoryDescriptor,
        workspace: Workspace,
        fetcher: Arc<dyn Fetcher>,
        registry: Arc<LanguageRegistry>,
    ) -> Self {
        Self {
            descriptor,
            workspace,
            fetcher,
            registry,
            state: Lifecycle::Uncreated,
            manifest: None,
            hooks: None,
            languages: None,
        }
    }

    /// Returns the descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &RepositoryDescriptor {
        &self.descriptor
    }

    /// Returns the remote location.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.descriptor.location
    }

    /// Returns the version pin.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.descriptor.version
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> Lifecycle {
        self.state
    }

    /// Returns true once the checkout is known to exist.
    #[must_use]
    pub fn is_created(&self) -> bool {
        self.state >= Lifecycle::Created
    }

    /// Returns true once every environment is known to be installed.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.state >= Lifecycle::Installed
    }

    /// Returns true if the manifest has been loaded.
    #[must_use]
    pub const fn is_manifest_loaded(&self) -> bool {
        self.manifest.is_some()
    }

    /// Derives a runner bound to this repository's checkout from a runner
    /// bound to the workspace root.
    #[must_use]
    pub fn command_runner(&self, workspace_runner: &CommandRunner) -> CommandRunner {
        workspace_runner.scoped(&self.descriptor.version)
    }

    /// Fetches the pinned version into the workspace unless it is already
    /// there.
    ///
    /// A failed fetch removes whatever it left behind before the error is
    /// returned.
    pub async fn create(&mut self) -> Result<()> {
        if self.is_created() {
            return Ok(());
        }

        let dest = self
            .workspace
            .in_version_dir(&self.descriptor.version, |dir| Ok(dir.to_path_buf()))?;

        if dest.exists() {
            debug!(version = %self.descriptor.version, "checkout already present");
            self.state = Lifecycle::Created;
            return Ok(());
        }

        info!("Installing environment for {}.", self.descriptor.location);
        info!("Once installed this environment will be reused.");
        info!("This may take a few minutes...");

        let guard = CleanOnFailure::new(&dest);
        self.fetcher
            .clone_no_checkout(&self.descriptor.location, &dest)
            .await?;
        self.fetcher
            .checkout(&dest, &self.descriptor.version)
            .await?;
        guard.commit();

        self.state = Lifecycle::Created;
        Ok(())
    }

    /// Calls [`create`](Self::create) unless the repository is already created.
    pub async fn require_created(&mut self) -> Result<()> {
        if !self.is_created() {
            self.create().await?;
        }
        Ok(())
    }

    /// Runs `f` with the checkout directory after making sure it exists.
    pub async fn in_checkout<T>(&mut self, f: impl FnOnce(&Path) -> Result<T>) -> Result<T> {
        self.require_created().await?;
        self.workspace.in_version_dir(&self.descriptor.version, f)
    }

    /// Returns the repository's manifest, loading it on first use.
    pub async fn manifest(&mut self) -> Result<&Manifest> {
        if self.manifest.is_none() {
            let manifest = self
                .in_checkout(|dir| Manifest::load(&dir.join(MANIFEST_FILE)))
                .await?;
            self.manifest = Some(manifest);
        }
        self.manifest.as_ref().ok_or_else(|| Error::Internal {
            message: "manifest missing after load".to_string(),
        })
    }

    /// Returns the effective hooks, merging configuration overrides with the
    /// manifest on first use.
    pub async fn hooks(&mut self) -> Result<&HookSet> {
        if self.hooks.is_none() {
            self.manifest().await?;
            let manifest = self.manifest.as_ref().ok_or_else(|| Error::Internal {
                message: "manifest missing after load".to_string(),
            })?;
            let hooks =
                HookSet::resolve(&self.descriptor.hooks, manifest, &self.descriptor.location)?;
            self.hooks = Some(hooks);
        }
        self.hooks.as_ref().ok_or_else(|| Error::Internal {
            message: "hooks missing after resolve".to_string(),
        })
    }

    /// Returns the distinct languages used by the effective hooks.
    pub async fn languages(&mut self) -> Result<&BTreeSet<String>> {
        if self.languages.is_none() {
            let languages = self
                .hooks()
                .await?
                .iter()
                .map(|hook| hook.language.clone())
                .collect();
            self.languages = Some(languages);
        }
        self.languages.as_ref().ok_or_else(|| Error::Internal {
            message: "languages missing after resolve".to_string(),
        })
    }

    /// Installs the environment of every language the hooks need.
    ///
    /// Languages without an environment marker, or whose marker already
    /// exists, are skipped. The repository only counts as installed once
    /// every language succeeded.
    pub async fn install(&mut self, workspace_runner: &CommandRunner) -> Result<()> {
        if self.is_installed() {
            return Ok(());
        }

        self.require_created().await?;
        let runner = self.command_runner(workspace_runner);
        let languages = self.languages().await?.clone();

        for name in &languages {
            let language = self.registry.get(name)?;
            match language.environment_dir() {
                None => {
                    debug!(language = %name, "no environment needed");
                    continue;
                },
                Some(dir) if runner.exists(dir) => {
                    debug!(language = %name, "environment already installed");
                    continue;
                },
                Some(_) => {},
            }
            info!(language = %name, version = %self.descriptor.version, "installing environment");
            language.install_environment(&runner).await?;
        }

        self.state = Lifecycle::Installed;
        Ok(())
    }

    /// Calls [`install`](Self::install) unless the repository is already
    /// installed.
    pub async fn require_installed(&mut self, workspace_runner: &CommandRunner) -> Result<()> {
        if !self.is_installed() {
            self.install(workspace_runner).await?;
        }
        Ok(())
    }

    /// Runs hook `hook_id` against `files` and returns the backend's output
    /// as is; a failing hook is an `Ok` with a non-zero exit code.
    pub async fn run_hook(
        &mut self,
        workspace_runner: &CommandRunner,
        hook_id: &str,
        files: &[String],
    ) -> Result<CommandOutput> {
        self.require_installed(workspace_runner).await?;
        let runner = self.command_runner(workspace_runner);
        let hook = self
            .hooks()
            .await?
            .get(hook_id)
            .cloned()
            .ok_or_else(|| Error::HookNotFound {
                id: hook_id.to_string(),
            })?;
        let language = self.registry.get(&hook.language)?;
        language.run_hook(&runner, &hook, files).await
    }
}
