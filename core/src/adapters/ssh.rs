//! SSH tunnel transport.
//!
//! Spawns `ssh -N -L <local>:127.0.0.1:<remote> <destination>` and waits for
//! the local end to start listening before handing the tunnel over.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::ports::TunnelTransportPort;
use crate::tunnel::{TunnelHandle, TunnelProcess};

/// Delay between checks while waiting for the forward to come up.
const STARTUP_POLL: Duration = Duration::from_millis(500);

/// Number of startup checks before giving up on the forward.
const STARTUP_CHECKS: u32 = 20;

/// Timeout for each port-listening check.
const PORT_CHECK_TIMEOUT: Duration = Duration::from_millis(500);

/// Creates SSH local-port-forward tunnels.
pub struct SshTransport {
    destination: String,
    identity_file: Option<PathBuf>,
}

impl SshTransport {
    /// Create a transport for an explicit SSH destination.
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            identity_file: None,
        }
    }

    /// Create a transport from gateway connection settings.
    pub fn from_config(config: &Config) -> Self {
        Self {
            destination: config.ssh_destination(),
            identity_file: config.identity_file.clone(),
        }
    }
}

impl TunnelTransportPort for SshTransport {
    async fn create(&self, remote_port: u16, preferred_local_port: u16) -> Result<TunnelHandle> {
        let forward = format!("{}:127.0.0.1:{}", preferred_local_port, remote_port);

        let mut command = Command::new("ssh");
        command
            .args([
                "-N",
                "-o",
                "ExitOnForwardFailure=yes",
                "-o",
                "BatchMode=yes",
                "-o",
                "ServerAliveInterval=30",
                "-L",
                &forward,
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        if let Some(identity) = &self.identity_file {
            command.arg("-i").arg(identity);
        }
        command.arg(&self.destination);

        let child = command
            .spawn()
            .map_err(|e| Error::Spawn(format!("failed to start ssh: {}", e)))?;
        debug!(
            local_port = preferred_local_port,
            remote_port,
            destination = %self.destination,
            "ssh forward starting"
        );

        let mut process = SshProcess { child };

        // ssh reports nothing for -L forwards, so the preferred port is
        // authoritative once it starts listening.
        for _ in 0..STARTUP_CHECKS {
            sleep(STARTUP_POLL).await;

            if !process.is_running() {
                return Err(Error::Spawn(
                    "ssh exited before the forward came up".to_string(),
                ));
            }
            if port_listening(preferred_local_port).await {
                return Ok(TunnelHandle::new(
                    Box::new(process),
                    preferred_local_port,
                    remote_port,
                ));
            }
        }

        warn!(
            local_port = preferred_local_port,
            "ssh forward never started listening"
        );
        process.terminate();
        Err(Error::Spawn(format!(
            "port {} never started listening",
            preferred_local_port
        )))
    }
}

/// Check whether something is listening on a local port.
async fn port_listening(port: u16) -> bool {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    matches!(
        timeout(PORT_CHECK_TIMEOUT, TcpStream::connect(addr)).await,
        Ok(Ok(_))
    )
}

/// A spawned ssh forwarding process.
struct SshProcess {
    child: Child,
}

impl TunnelProcess for SshProcess {
    fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    fn terminate(&mut self) {
        if let Err(e) = self.child.start_kill() {
            debug!(error = %e, "ssh process already gone");
        }
    }
}
