//! Hooks that run a command already installed on the machine.

use super::{hook_arguments, Language};
use crate::core::command::CommandRunner;
use crate::core::error::Result;
use crate::core::executor::CommandOutput;
use crate::manifest::Hook;
use async_trait::async_trait;

/// The `system` language backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct System;

#[async_trait]
impl Language for System {
    fn name(&self) -> &'static str {
        "system"
    }

    fn environment_dir(&self) -> Option<&'static str> {
        None
    }

    async fn install_environment(&self, _runner: &CommandRunner) -> Result<()> {
        Ok(())
    }

    async fn run_hook(
        &self,
        runner: &CommandRunner,
        hook: &Hook,
        files: &[String],
    ) -> Result<CommandOutput> {
        let script = format!("{} \"$@\"", hook.entry);
        runner
            .run_shell(&script, &hook.id, &hook_arguments(hook, files))
            .await
    }
}
