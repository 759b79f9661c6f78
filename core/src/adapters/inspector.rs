//! System port inspector with platform-specific listener lookup.
//!
//! Uses `ss` on Linux and `lsof` on macOS to find the process listening on
//! a port, enriched with the full command line from `ps`. The health probe
//! is application-level: the gateway control port speaks HTTP, so a bare
//! accepting socket is not considered healthy.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::process::Stdio;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::domain::ProcessDescriptor;
use crate::ports::PortInspectorPort;

/// Bound on each stage of the health probe (connect, write, read).
const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// OS-backed port inspector.
pub struct SystemInspector {
    /// Pids already reclaimed. Filtered out of lookups so a half-dead
    /// process cannot resurface while the OS tables lag behind a kill.
    reaped: RwLock<HashSet<i32>>,
}

impl SystemInspector {
    /// Create a new system inspector.
    pub fn new() -> Self {
        Self {
            reaped: RwLock::new(HashSet::new()),
        }
    }

    /// Get the full command line for a pid using ps.
    ///
    /// Executes: `ps -o command= -p <pid>`
    async fn command_line(&self, pid: i32) -> Option<String> {
        let output = Command::new("/bin/ps")
            .args(["-o", "command=", "-p", &pid.to_string()])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .ok()?;

        let stdout = String::from_utf8(output.stdout).ok()?;
        let command = stdout.trim();
        if command.is_empty() {
            None
        } else {
            Some(command.to_string())
        }
    }

    /// Resolve the executable path for a pid, when the platform allows it.
    #[cfg(target_os = "linux")]
    async fn executable_path(&self, pid: i32) -> Option<String> {
        tokio::fs::read_link(format!("/proc/{}/exe", pid))
            .await
            .ok()
            .map(|path| path.to_string_lossy().into_owned())
    }

    /// Resolve the executable path for a pid, when the platform allows it.
    ///
    /// Executes: `ps -o comm= -p <pid>`
    #[cfg(not(target_os = "linux"))]
    async fn executable_path(&self, pid: i32) -> Option<String> {
        let output = Command::new("/bin/ps")
            .args(["-o", "comm=", "-p", &pid.to_string()])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .ok()?;

        let stdout = String::from_utf8(output.stdout).ok()?;
        let path = stdout.trim();
        if path.is_empty() {
            None
        } else {
            Some(path.to_string())
        }
    }

    /// Find the pid listening on a local TCP port.
    ///
    /// Executes: `ss -Htlnp sport = :<port>`
    #[cfg(target_os = "linux")]
    async fn listener_pid(&self, port: u16) -> Option<i32> {
        let output = match Command::new("/usr/sbin/ss")
            .args(["-Htlnp", &format!("sport = :{}", port)])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                warn!(port, error = %e, "failed to run ss");
                return None;
            }
        };

        let stdout = String::from_utf8(output.stdout).ok()?;
        parse_ss_listener_pid(&stdout)
    }

    /// Find the pid listening on a local TCP port.
    ///
    /// Executes: `lsof -nP -iTCP:<port> -sTCP:LISTEN -t`
    ///
    /// Flags explained:
    /// - -iTCP:\<port\>: Show only TCP sockets on this port
    /// - -sTCP:LISTEN: Show only listening sockets
    /// - -P: Show port numbers (don't resolve to service names)
    /// - -n: Show IP addresses (don't resolve to hostnames)
    /// - -t: Terse output, pids only
    #[cfg(not(target_os = "linux"))]
    async fn listener_pid(&self, port: u16) -> Option<i32> {
        let output = match Command::new("/usr/sbin/lsof")
            .args([
                "-nP",
                &format!("-iTCP:{}", port),
                "-sTCP:LISTEN",
                "-t",
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                warn!(port, error = %e, "failed to run lsof");
                return None;
            }
        };

        let stdout = String::from_utf8(output.stdout).ok()?;
        parse_lsof_listener_pid(&stdout)
    }
}

impl Default for SystemInspector {
    fn default() -> Self {
        Self::new()
    }
}

impl PortInspectorPort for SystemInspector {
    async fn describe(&self, port: u16) -> Option<ProcessDescriptor> {
        let pid = self.listener_pid(port).await?;

        if self.reaped.read().contains(&pid) {
            debug!(port, pid, "ignoring reclaimed pid still in OS tables");
            return None;
        }

        let command = match self.command_line(pid).await {
            Some(command) => command,
            None => {
                // Listener vanished between the port lookup and ps.
                debug!(port, pid, "listener disappeared during lookup");
                return None;
            }
        };
        let executable = self.executable_path(pid).await;

        Some(ProcessDescriptor::new(pid, command, executable))
    }

    async fn probe_health(&self, port: u16) -> bool {
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let mut stream = match timeout(PROBE_TIMEOUT, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => stream,
            _ => return false,
        };

        // An ssh forward accepts locally even when the remote end is gone,
        // so require the gateway to actually answer an HTTP request.
        let request = format!(
            "GET / HTTP/1.1\r\nHost: 127.0.0.1:{}\r\nConnection: close\r\n\r\n",
            port
        );
        if !matches!(
            timeout(PROBE_TIMEOUT, stream.write_all(request.as_bytes())).await,
            Ok(Ok(()))
        ) {
            return false;
        }

        let mut buf = [0u8; 64];
        matches!(
            timeout(PROBE_TIMEOUT, stream.read(&mut buf)).await,
            Ok(Ok(n)) if n > 0
        )
    }

    async fn remove_record(&self, pid: i32) {
        self.reaped.write().insert(pid);
    }
}

/// Parse the pid out of `ss -Htlnp` output.
///
/// Expected ss output format:
/// ```text
/// LISTEN 0 128 127.0.0.1:18789 0.0.0.0:* users:(("ssh",pid=4321,fd=5))
/// ```
#[cfg(any(target_os = "linux", test))]
fn parse_ss_listener_pid(output: &str) -> Option<i32> {
    static USERS_RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    let regex = USERS_RE
        .get_or_init(|| regex::Regex::new(r#"users:\(\("(?:.+?)",pid=(\d+),fd="#).unwrap());
    for line in output.lines() {
        if let Some(caps) = regex.captures(line) {
            if let Ok(pid) = caps[1].parse() {
                return Some(pid);
            }
        }
    }
    None
}

/// Parse the pid out of `lsof -t` output (one pid per line).
#[cfg(any(not(target_os = "linux"), test))]
fn parse_lsof_listener_pid(output: &str) -> Option<i32> {
    output.lines().find_map(|line| line.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ss_listener_pid() {
        let output = r#"LISTEN 0 128 127.0.0.1:18789 0.0.0.0:* users:(("ssh",pid=4321,fd=5))"#;
        assert_eq!(parse_ss_listener_pid(output), Some(4321));
    }

    #[test]
    fn test_parse_ss_no_listener() {
        assert_eq!(parse_ss_listener_pid(""), None);
        assert_eq!(parse_ss_listener_pid("LISTEN 0 128 127.0.0.1:80 0.0.0.0:*"), None);
    }

    #[test]
    fn test_parse_lsof_listener_pid() {
        assert_eq!(parse_lsof_listener_pid("4321\n"), Some(4321));
        assert_eq!(parse_lsof_listener_pid("4321\n5678\n"), Some(4321));
        assert_eq!(parse_lsof_listener_pid(""), None);
    }

    #[tokio::test]
    async fn test_remove_record_marks_pid_reaped() {
        let inspector = SystemInspector::new();
        inspector.remove_record(4321).await;
        assert!(inspector.reaped.read().contains(&4321));
    }

    #[tokio::test]
    async fn test_probe_rejects_closed_port() {
        let inspector = SystemInspector::new();
        // Nothing listens here; the probe must fail fast, not error.
        assert!(!inspector.probe_health(1).await);
    }
}
