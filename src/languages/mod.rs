//! Language backends.
//!
//! Each backend knows how to prepare an isolated environment inside a hook
//! repository checkout and how to run a hook from it. Backends are looked up
//! by name through a [`LanguageRegistry`]; adding a language means
//! registering another [`Language`] implementation.
//!
//! Built-in backends:
//! - [`python`]: virtualenv in `py_env`
//! - [`node`]: nodeenv in `node_env`
//! - [`script`]: executable shipped in the repository, no environment
//! - [`system`]: command already available on the machine, no environment

pub mod node;
pub mod python;
pub mod script;
pub mod system;

use crate::core::command::CommandRunner;
use crate::core::error::{Error, Result};
use crate::core::executor::{CommandOutput, Executor};
use crate::manifest::Hook;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A language backend.
#[async_trait]
pub trait Language: Send + Sync + std::fmt::Debug {
    /// Name used by manifests to select this backend.
    fn name(&self) -> &'static str;

    /// Directory, relative to the checkout, whose existence means the
    /// environment is installed. `None` means no installation is ever needed.
    fn environment_dir(&self) -> Option<&'static str>;

    /// Installs the environment into the runner's prefix.
    async fn install_environment(&self, runner: &CommandRunner) -> Result<()>;

    /// Runs `hook` against `files`. A non-zero exit is returned, not raised.
    async fn run_hook(
        &self,
        runner: &CommandRunner,
        hook: &Hook,
        files: &[String],
    ) -> Result<CommandOutput>;
}

/// Language backends keyed by name.
#[derive(Debug, Clone, Default)]
pub struct LanguageRegistry {
    languages: BTreeMap<String, Arc<dyn Language>>,
}

impl LanguageRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every built-in backend.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(python::Python));
        registry.register(Arc::new(node::Node));
        registry.register(Arc::new(script::Script));
        registry.register(Arc::new(system::System));
        registry
    }

    /// Registers `language` under its name, replacing any previous backend.
    pub fn register(&mut self, language: Arc<dyn Language>) {
        self.languages.insert(language.name().to_string(), language);
    }

    /// Looks up a backend.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Language>> {
        self.languages
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownLanguage {
                language: name.to_string(),
            })
    }

    /// Returns true if a backend is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.languages.contains_key(name)
    }

    /// Returns registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }
}

/// Fails with [`Error::CommandNotFound`] unless `command` is on `PATH`.
pub(crate) fn require_command(command: &str) -> Result<()> {
    if Executor::command_exists(command) {
        Ok(())
    } else {
        Err(Error::CommandNotFound {
            command: command.to_string(),
        })
    }
}

/// Runs one installation step inside the prefix, turning a non-zero exit
/// into an install error.
pub(crate) async fn install_step(
    runner: &CommandRunner,
    language: &str,
    argv: &[&str],
) -> Result<()> {
    let argv: Vec<String> = argv.iter().map(|a| (*a).to_string()).collect();
    let output = runner.run_in_prefix(&argv).await?;
    if output.success() {
        Ok(())
    } else {
        Err(Error::install(
            language,
            format!(
                "`{}` exited with {}: {}",
                argv.join(" "),
                output.exit_code,
                output.combined_output().trim()
            ),
        ))
    }
}

/// Hook arguments followed by the files to check.
pub(crate) fn hook_arguments(hook: &Hook, files: &[String]) -> Vec<String> {
    hook.args.iter().chain(files).cloned().collect()
}

/// Runs `hook.entry` as a shell command with `env_dir`'s activation script
/// sourced first.
pub(crate) async fn run_in_env(
    runner: &CommandRunner,
    env_dir: &str,
    hook: &Hook,
    files: &[String],
) -> Result<CommandOutput> {
    let script = format!(
        ". '{{prefix}}{env_dir}/bin/activate' && {} \"$@\"",
        hook.entry
    );
    runner
        .run_shell(&script, &hook.id, &hook_arguments(hook, files))
        .await
}
