//! Short-lived command runner backed by tokio processes.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::warn;

use crate::ports::ProcessRunnerPort;

/// Runs commands to completion with a timeout.
pub struct CommandRunner;

impl ProcessRunnerPort for CommandRunner {
    async fn run(
        &self,
        args: &[&str],
        cwd: Option<&Path>,
        env: &[(&str, &str)],
        limit: Duration,
    ) -> bool {
        let Some((program, rest)) = args.split_first() else {
            return false;
        };

        let mut command = Command::new(program);
        command
            .args(rest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            // A timed-out command must not outlive the attempt.
            .kill_on_drop(true);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }
        for (key, value) in env {
            command.env(key, value);
        }

        match timeout(limit, command.status()).await {
            Ok(Ok(status)) => status.success(),
            Ok(Err(e)) => {
                warn!(command = %program, error = %e, "failed to run command");
                false
            }
            Err(_) => {
                warn!(command = %program, timeout_ms = limit.as_millis() as u64, "command timed out");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_command() {
        let runner = CommandRunner;
        assert!(
            runner
                .run(&["/bin/sh", "-c", "exit 0"], None, &[], Duration::from_secs(5))
                .await
        );
    }

    #[tokio::test]
    async fn test_failing_command() {
        let runner = CommandRunner;
        assert!(
            !runner
                .run(&["/bin/sh", "-c", "exit 1"], None, &[], Duration::from_secs(5))
                .await
        );
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let runner = CommandRunner;
        assert!(
            !runner
                .run(
                    &["/nonexistent/definitely-not-a-binary"],
                    None,
                    &[],
                    Duration::from_secs(5)
                )
                .await
        );
    }

    #[tokio::test]
    async fn test_timeout() {
        let runner = CommandRunner;
        assert!(
            !runner
                .run(
                    &["/bin/sh", "-c", "sleep 5"],
                    None,
                    &[],
                    Duration::from_millis(100)
                )
                .await
        );
    }

    #[tokio::test]
    async fn test_empty_args() {
        let runner = CommandRunner;
        assert!(!runner.run(&[], None, &[], Duration::from_secs(1)).await);
    }
}
