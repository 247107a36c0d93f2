//! Node hooks, installed into a nodeenv inside the checkout.

use super::{install_step, require_command, run_in_env, Language};
use crate::core::command::CommandRunner;
use crate::core::error::Result;
use crate::core::executor::CommandOutput;
use crate::core::workspace::CleanOnFailure;
use crate::manifest::Hook;
use async_trait::async_trait;

/// Environment directory created inside the checkout.
pub const ENVIRONMENT_DIR: &str = "node_env";

/// The `node` language backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct Node;

#[async_trait]
impl Language for Node {
    fn name(&self) -> &'static str {
        "node"
    }

    fn environment_dir(&self) -> Option<&'static str> {
        Some(ENVIRONMENT_DIR)
    }

    async fn install_environment(&self, runner: &CommandRunner) -> Result<()> {
        require_command("nodeenv")?;
        let guard = CleanOnFailure::new(runner.path(ENVIRONMENT_DIR));
        install_step(
            runner,
            self.name(),
            &["nodeenv", "--prebuilt", ENVIRONMENT_DIR],
        )
        .await?;
        install_step(
            runner,
            self.name(),
            &["sh", "-c", ". node_env/bin/activate && npm install -g"],
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata() {
        assert_eq!(Node.name(), "node");
        assert_eq!(Node.environment_dir(), Some("node_env"));
    }
}
