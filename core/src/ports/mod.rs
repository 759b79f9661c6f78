//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces that the tunnel lifecycle manager uses
//! to interact with external systems. Implementations live in `adapters`.

mod inspector;
mod runner;
mod settings;
mod transport;

pub use inspector::PortInspectorPort;
pub use runner::ProcessRunnerPort;
pub use settings::SettingsPort;
pub use transport::TunnelTransportPort;
