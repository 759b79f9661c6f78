//! Short-lived command runner port (interface).

use std::path::Path;
use std::time::Duration;

/// Port for executing short-lived commands with a timeout.
///
/// Used by the lifecycle manager only for `kill -TERM <pid>` and
/// `kill -KILL <pid>` during stale-tunnel reclamation.
pub trait ProcessRunnerPort: Send + Sync {
    /// Run a command to completion within `timeout`.
    ///
    /// Returns `true` only if the command started, exited within the
    /// timeout, and reported success. Failures are logged by the
    /// implementation, never surfaced as errors.
    fn run(
        &self,
        args: &[&str],
        cwd: Option<&Path>,
        env: &[(&str, &str)],
        timeout: Duration,
    ) -> impl std::future::Future<Output = bool> + Send;
}
