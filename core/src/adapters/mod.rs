//! Adapters layer - External system implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.
//! Each adapter handles communication with external systems.

mod inspector;
mod runner;
mod ssh;

// Re-export main types for convenience
pub use inspector::SystemInspector;
pub use runner::CommandRunner;
pub use ssh::SshTransport;
