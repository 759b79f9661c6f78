//! Tunnel transport port (interface).

use crate::error::Result;
use crate::tunnel::TunnelHandle;

/// Port for creating new forwarding tunnels.
///
/// Implementations own the spawn mechanics (ssh arguments, stabilization
/// wait) and report failures as [`crate::Error::Spawn`].
pub trait TunnelTransportPort: Send + Sync {
    /// Create a new tunnel forwarding `remote_port`, preferring
    /// `preferred_local_port` for the local end.
    fn create(
        &self,
        remote_port: u16,
        preferred_local_port: u16,
    ) -> impl std::future::Future<Output = Result<TunnelHandle>> + Send;
}
