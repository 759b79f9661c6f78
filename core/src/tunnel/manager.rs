//! Tunnel lifecycle manager.
//!
//! Decides whether an existing tunnel is still usable, detects and reclaims
//! tunnels left over from a previous process generation, and creates a new
//! tunnel when none is available. All public operations run under a single
//! lock held for the whole decision sequence (check, classify, reclaim,
//! spawn), so concurrent callers never race to spawn duplicate tunnels.

use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::handle::TunnelHandle;
use crate::config::Mode;
use crate::domain::ProcessDescriptor;
use crate::error::{Error, Result};
use crate::ports::{PortInspectorPort, ProcessRunnerPort, SettingsPort, TunnelTransportPort};

/// Bound on each kill attempt during stale reclamation.
const KILL_TIMEOUT: Duration = Duration::from_secs(2);

/// Manages at most one control tunnel.
///
/// Generic over the settings, inspector, runner and transport seams so the
/// decision logic can be tested with in-memory fakes.
pub struct TunnelManager<S, I, R, T> {
    settings: S,
    inspector: I,
    runner: R,
    transport: T,

    /// The single live tunnel, if any. Locked across whole operations.
    state: Mutex<Option<TunnelHandle>>,
}

impl<S, I, R, T> TunnelManager<S, I, R, T>
where
    S: SettingsPort,
    I: PortInspectorPort,
    R: ProcessRunnerPort,
    T: TunnelTransportPort,
{
    /// Create a manager with the given collaborators.
    pub fn new(settings: S, inspector: I, runner: R, transport: T) -> Self {
        Self {
            settings,
            inspector,
            runner,
            transport,
            state: Mutex::new(None),
        }
    }

    /// Return the local port of a usable tunnel, without creating one.
    ///
    /// Checks the manager's own handle first, then looks for a reusable
    /// forward left by a previous process generation. A stale forward on
    /// the desired port is reclaimed before returning `None`.
    pub async fn port_if_running(&self) -> Option<u16> {
        let mut state = self.state.lock().await;
        self.port_if_running_locked(&mut state).await
    }

    /// Ensure a control tunnel exists and return its local port.
    ///
    /// Idempotent: repeated calls while the tunnel stays healthy return the
    /// same port without spawning anything.
    pub async fn ensure_control_tunnel(&self) -> Result<u16> {
        let mut state = self.state.lock().await;

        if self.settings.mode() != Mode::Remote {
            return Err(Error::RemoteModeDisabled);
        }

        if let Some(port) = self.port_if_running_locked(&mut state).await {
            return Ok(port);
        }

        let remote_port = self.settings.gateway_port();
        let local_port = self.settings.preferred_local_port();

        let handle = self.transport.create(remote_port, local_port).await?;
        let port = handle.local_port();
        info!(port, remote_port, "control tunnel established");
        *state = Some(handle);

        Ok(port)
    }

    /// Terminate the managed tunnel, if any. Idempotent.
    pub async fn stop_all(&self) {
        let mut state = self.state.lock().await;
        if let Some(mut handle) = state.take() {
            info!(port = handle.local_port(), "stopping control tunnel");
            handle.terminate();
        }
    }

    /// Body of [`port_if_running`], run with the state lock held.
    async fn port_if_running_locked(&self, state: &mut Option<TunnelHandle>) -> Option<u16> {
        // Our own handle: trust it only while the process runs and the
        // forwarded port answers the health probe.
        if let Some(handle) = state.as_mut() {
            let port = handle.local_port();
            if handle.is_running() {
                if self.inspector.probe_health(port).await {
                    return Some(port);
                }
                warn!(port, "tunnel process alive but not answering, discarding");
            } else {
                warn!(port, "tunnel process exited");
            }
            if let Some(mut handle) = state.take() {
                handle.terminate();
            }
        }

        // No usable handle: look for a forward left by a previous process
        // generation on the desired port.
        let port = self.settings.preferred_local_port();
        let descriptor = self.inspector.describe(port).await?;

        if !descriptor.is_ssh_forwarder() {
            // Someone else's listener. Never touch it.
            debug!(
                port,
                pid = descriptor.pid,
                command = %descriptor.command,
                "listener on control port is not an ssh forward, leaving it alone"
            );
            return None;
        }

        if self.inspector.probe_health(port).await {
            // Recognized again on each call via the descriptor lookup; no
            // handle is created for a foreign forward.
            info!(
                port,
                pid = descriptor.pid,
                "reusing ssh forward from a previous run"
            );
            return Some(port);
        }

        self.reclaim_stale(port, &descriptor).await;
        None
    }

    /// Kill a dead or stuck previous-generation forward on `port`.
    ///
    /// Graceful TERM first, then a forceful KILL, each independently
    /// bounded. Some ssh processes ignore the first signal while a
    /// forwarded connection is still half-open.
    async fn reclaim_stale(&self, port: u16, descriptor: &ProcessDescriptor) {
        warn!(port, pid = descriptor.pid, "reclaiming stale tunnel");

        let pid = descriptor.pid.to_string();
        let mut killed = self
            .runner
            .run(&["kill", "-TERM", &pid], None, &[], KILL_TIMEOUT)
            .await;
        if !killed {
            killed = self
                .runner
                .run(&["kill", "-KILL", &pid], None, &[], KILL_TIMEOUT)
                .await;
        }

        self.inspector.remove_record(descriptor.pid).await;

        if !killed {
            warn!(
                port,
                pid = descriptor.pid,
                "stale tunnel survived both kill attempts"
            );
        }
    }
}
