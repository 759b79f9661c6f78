//! Tunnel lifecycle management.
//!
//! The [`TunnelManager`] owns at most one live tunnel and serializes all
//! reuse/reclaim/spawn decisions. [`TunnelHandle`] represents one live
//! forwarding process plus its allocated local port.

mod handle;
mod manager;

pub use handle::{TunnelHandle, TunnelProcess};
pub use manager::TunnelManager;

use crate::adapters::{CommandRunner, SshTransport, SystemInspector};
use crate::config::Config;

/// Tunnel manager wired to the system adapters.
pub type SystemTunnelManager = TunnelManager<Config, SystemInspector, CommandRunner, SshTransport>;

impl SystemTunnelManager {
    /// Create a manager backed by the OS inspector, command runner and
    /// ssh transport, configured from `config`.
    pub fn system(config: Config) -> Self {
        let transport = SshTransport::from_config(&config);
        TunnelManager::new(config, SystemInspector::new(), CommandRunner, transport)
    }
}
