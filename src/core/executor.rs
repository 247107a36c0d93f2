//! Process execution for fetching, installing and running hooks.
//!
//! This module provides utilities for executing external programs
//! with optional timeout support, output capture, and error handling.

use crate::core::error::{Error, Result};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::timeout;

/// Output from a command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code of the command.
    pub exit_code: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
    /// Whether the command was killed due to timeout.
    pub timed_out: bool,
    /// Duration the command took to run.
    pub duration: Duration,
}

impl CommandOutput {
    /// Creates an output for a command that exited with `exit_code`.
    #[must_use]
    pub fn new(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
            timed_out: false,
            duration: Duration::ZERO,
        }
    }

    /// Returns true if the command succeeded (exit code 0).
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }

    /// Returns combined stdout and stderr output.
    #[must_use]
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Options for command execution.
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Working directory for the command.
    pub cwd: Option<std::path::PathBuf>,
    /// Timeout for the command. `None` waits until the process exits.
    pub timeout: Option<Duration>,
    /// Environment variables to set.
    pub env: Vec<(String, String)>,
    /// Whether to capture output (vs streaming to console).
    pub capture_output: bool,
    /// Shell to use for [`Executor::execute_shell`] (default: sh).
    pub shell: Option<String>,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            cwd: None,
            timeout: None,
            env: Vec::new(),
            capture_output: true,
            shell: None,
        }
    }
}

impl ExecuteOptions {
    /// Sets the working directory.
    #[must_use]
    pub fn cwd(mut self, path: impl AsRef<Path>) -> Self {
        self.cwd = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets an environment variable.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Sets whether to capture output.
    #[must_use]
    pub const fn capture_output(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }
}

/// Executor for running external programs.
#[derive(Debug, Default, Clone, Copy)]
pub struct Executor;

impl Executor {
    /// Creates a new executor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Executes `program` with `args`, without going through a shell.
    pub async fn execute(
        &self,
        program: &str,
        args: &[String],
        options: &ExecuteOptions,
    ) -> Result<CommandOutput> {
        let start = std::time::Instant::now();

        let mut cmd = Command::new(program);
        cmd.args(args);

        if let Some(ref cwd) = options.cwd {
            cmd.current_dir(cwd);
        }

        for (key, value) in &options.env {
            cmd.env(key, value);
        }

        cmd.stdin(Stdio::null());

        if options.capture_output {
            cmd.stdout(Stdio::piped());
            cmd.stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit());
            cmd.stderr(Stdio::inherit());
        }

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::CommandNotFound {
                    command: program.to_string(),
                }
            } else {
                Error::io(format!("spawn {program}"), e)
            }
        })?;

        tracing::debug!(program, ?args, cwd = ?options.cwd, "spawned process");

        let result = if let Some(timeout_duration) = options.timeout {
            match timeout(timeout_duration, async {
                self.wait_for_output(&mut child, options.capture_output).await
            })
            .await
            {
                Ok(result) => result,
                Err(_) => {
                    // Kill the process on timeout - ignore result since we're returning anyway
                    drop(child.kill().await);
                    return Ok(CommandOutput {
                        exit_code: 124,
                        stdout: String::new(),
                        stderr: "Command timed out".to_string(),
                        timed_out: true,
                        duration: start.elapsed(),
                    });
                },
            }
        } else {
            self.wait_for_output(&mut child, options.capture_output)
                .await
        };

        let (exit_code, stdout, stderr) = result?;

        Ok(CommandOutput {
            exit_code,
            stdout,
            stderr,
            timed_out: false,
            duration: start.elapsed(),
        })
    }

    /// Executes `script` through the shell. `arg0` becomes `$0` and
    /// `positional` the script's `"$@"`.
    pub async fn execute_shell(
        &self,
        script: &str,
        arg0: &str,
        positional: &[String],
        options: &ExecuteOptions,
    ) -> Result<CommandOutput> {
        let shell = options.shell.as_deref().unwrap_or("sh");

        let mut args = Vec::with_capacity(positional.len() + 3);
        args.push("-c".to_string());
        args.push(script.to_string());
        args.push(arg0.to_string());
        args.extend(positional.iter().cloned());

        self.execute(shell, &args, options).await
    }

    /// Waits for the command to complete and captures output.
    async fn wait_for_output(
        &self,
        child: &mut tokio::process::Child,
        capture: bool,
    ) -> Result<(i32, String, String)> {
        if capture {
            let stdout = child.stdout.take();
            let stderr = child.stderr.take();

            let stdout_handle = tokio::spawn(read_lossy(stdout));
            let stderr_handle = tokio::spawn(read_lossy(stderr));

            let status = child.wait().await.map_err(|e| Error::io("wait for command", e))?;

            let stdout = stdout_handle
                .await
                .map_err(|e| Error::Internal {
                    message: format!("stdout task failed: {e}"),
                })??;
            let stderr = stderr_handle
                .await
                .map_err(|e| Error::Internal {
                    message: format!("stderr task failed: {e}"),
                })??;

            Ok((status.code().unwrap_or(1), stdout, stderr))
        } else {
            let status = child.wait().await.map_err(|e| Error::io("wait for command", e))?;
            Ok((status.code().unwrap_or(1), String::new(), String::new()))
        }
    }

    /// Checks if a command exists in PATH.
    #[must_use]
    pub fn command_exists(command: &str) -> bool {
        which::which(command).is_ok()
    }
}

/// Reads a pipe to the end. Bytes that are not UTF-8 are replaced, never
/// dropped.
async fn read_lossy(pipe: Option<impl AsyncRead + Unpin>) -> Result<String> {
    let mut bytes = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut bytes)
            .await
            .map_err(|e| Error::io("read command output", e))?;
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn test_execute_simple_command() {
        let output = Executor::new()
            .execute("echo", &args(&["hello"]), &ExecuteOptions::default())
            .await
            .expect("should succeed");

        assert!(output.success());
        assert!(output.stdout.contains("hello"));
    }

    #[tokio::test]
    async fn test_execute_failing_command_is_not_an_error() {
        let output = Executor::new()
            .execute_shell("exit 3", "hook", &[], &ExecuteOptions::default())
            .await
            .expect("should complete");

        assert!(!output.success());
        assert_eq!(output.exit_code, 3);
    }

    #[tokio::test]
    async fn test_execute_shell_positional_args() {
        let output = Executor::new()
            .execute_shell(
                "echo \"$0:$#:$@\"",
                "lint",
                &args(&["a.txt", "b.txt"]),
                &ExecuteOptions::default(),
            )
            .await
            .expect("should succeed");

        assert_eq!(output.stdout.trim(), "lint:2:a.txt b.txt");
    }

    #[tokio::test]
    async fn test_invalid_utf8_output_is_kept() {
        let output = Executor::new()
            .execute_shell(
                "printf 'bad \\377 byte\\n'; echo after; echo oops >&2; exit 3",
                "hook",
                &[],
                &ExecuteOptions::default(),
            )
            .await
            .expect("should complete");

        assert_eq!(output.exit_code, 3);
        assert_eq!(output.stdout, "bad \u{fffd} byte\nafter\n");
        assert_eq!(output.stderr, "oops\n");
    }

    #[tokio::test]
    async fn test_output_without_trailing_newline() {
        let output = Executor::new()
            .execute_shell("printf partial", "hook", &[], &ExecuteOptions::default())
            .await
            .expect("should succeed");

        assert_eq!(output.stdout, "partial");
    }

    #[tokio::test]
    async fn test_execute_in_cwd() {
        let temp = tempfile::TempDir::new().expect("create temp dir");
        std::fs::write(temp.path().join("marker"), "").expect("write marker");

        let output = Executor::new()
            .execute("ls", &[], &ExecuteOptions::default().cwd(temp.path()))
            .await
            .expect("should succeed");

        assert!(output.stdout.contains("marker"));
    }

    #[tokio::test]
    async fn test_execute_timeout() {
        let output = Executor::new()
            .execute(
                "sleep",
                &args(&["10"]),
                &ExecuteOptions::default().timeout(Duration::from_millis(100)),
            )
            .await
            .expect("should complete");

        assert!(output.timed_out);
        assert_eq!(output.exit_code, 124);
    }

    #[tokio::test]
    async fn test_execute_missing_program() {
        let result = Executor::new()
            .execute(
                "definitely_not_a_real_command_12345",
                &[],
                &ExecuteOptions::default(),
            )
            .await;

        assert!(matches!(result, Err(Error::CommandNotFound { .. })));
    }

    #[test]
    fn test_combined_output() {
        assert_eq!(CommandOutput::new(0, "out", "").combined_output(), "out");
        assert_eq!(CommandOutput::new(0, "", "err").combined_output(), "err");
        assert_eq!(
            CommandOutput::new(1, "out", "err").combined_output(),
            "out\nerr"
        );
    }

    #[test]
    fn test_command_exists() {
        assert!(Executor::command_exists("sh"));
        assert!(!Executor::command_exists("definitely_not_a_real_command_12345"));
    }
}
