//! Python hooks, installed into a virtualenv inside the checkout.

use super::{install_step, require_command, run_in_env, Language};
use crate::core::command::CommandRunner;
use crate::core::error::Result;
use crate::core::executor::CommandOutput;
use crate::core::workspace::CleanOnFailure;
use crate::manifest::Hook;
use async_trait::async_trait;

/// Environment directory created inside the checkout.
pub const ENVIRONMENT_DIR: &str = "py_env";

/// The `python` language backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct Python;

#[async_trait]
impl Language for Python {
    fn name(&self) -> &'static str {
        "python"
    }

    fn environment_dir(&self) -> Option<&'static str> {
        Some(ENVIRONMENT_DIR)
    }

    async fn install_environment(&self, runner: &CommandRunner) -> Result<()> {
        require_command("virtualenv")?;
        let guard = CleanOnFailure::new(runner.path(ENVIRONMENT_DIR));
        install_step(runner, self.name(), &["virtualenv", ENVIRONMENT_DIR]).await?;
        install_step(
            runner,
            self.name(),
            &["sh", "-c", ". py_env/bin/activate && pip install ."],
        )
        .await?;
        guard.commit();
        Ok(())
    }

    async fn run_hook(
        &self,
        runner: &CommandRunner,
        hook: &Hook,
        files: &[String],
    ) -> Result<CommandOutput> {
        run_in_env(runner, ENVIRONMENT_DIR, hook, files).await
    }
}
