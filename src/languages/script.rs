//! Hooks whose entry is an executable inside the repository itself.

use super::{hook_arguments, Language};
use crate::core::command::{CommandRunner, PREFIX_PLACEHOLDER};
use crate::core::error::Result;
use crate::core::executor::CommandOutput;
use crate::manifest::Hook;
use async_trait::async_trait;

/// The `script` language backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct Script;

#[async_trait]
impl Language for Script {
    fn name(&self) -> &'static str {
        "script"
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
        let mut argv = vec![format!("{PREFIX_PLACEHOLDER}{}", hook.entry)];
        argv.extend(hook_arguments(hook, files));
        runner.run(&argv).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::testing;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn write_script(dir: &std::path::Path, name: &str, body: &str) {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, body).expect("write script");
        let mut perms = std::fs::metadata(&path).expect("metadata").permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).expect("chmod");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runs_script_from_prefix() {
        let temp = TempDir::new().expect("create temp dir");
        write_script(temp.path(), "check.sh", "#!/bin/sh\necho \"checked $*\"\nexit 1\n");

        let runner = CommandRunner::new(temp.path());
        let mut hook = testing::hook("check", "check.sh", "script");
        hook.args = vec!["-v".to_string()];

        let output = Script
            .run_hook(&runner, &hook, &["a.txt".to_string()])
            .await
            .expect("run script");

        assert_eq!(output.exit_code, 1);
        assert_eq!(output.stdout.trim(), "checked -v a.txt");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_names_are_not_substituted() {
        let temp = TempDir::new().expect("create temp dir");
        write_script(temp.path(), "check.sh", "#!/bin/sh\necho \"$*\"\n");

        let runner = CommandRunner::new(temp.path());
        let hook = testing::hook("check", "check.sh", "script");

        let output = Script
            .run_hook(&runner, &hook, &["{prefix}odd.txt".to_string()])
            .await
            .expect("run script");

        assert_eq!(output.stdout.trim(), "{prefix}odd.txt");
    }

    #[tokio::test]
    async fn test_install_is_noop() {
        let temp = TempDir::new().expect("create temp dir");
        Script
            .install_environment(&CommandRunner::new(temp.path()))
            .await
            .expect("install");
        assert_eq!(Script.environment_dir(), None);
    }
}
