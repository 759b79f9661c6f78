//! Connection settings port (interface).

use crate::config::Mode;

/// Port for resolving gateway connection settings.
///
/// Pure reads with no side effects, consulted once per lifecycle decision.
pub trait SettingsPort: Send + Sync {
    /// The operating mode (local or remote).
    fn mode(&self) -> Mode;

    /// The remote port carrying gateway control traffic.
    fn gateway_port(&self) -> u16;

    /// The local port the tunnel should prefer.
    fn preferred_local_port(&self) -> u16;
}
