//! Tunnelkeeper Core Library
//!
//! Maintains a single outbound SSH local-port-forward that exposes a remote
//! gateway control port on a local port. Provides functionality to:
//! - Decide whether an existing tunnel is still usable (health probing)
//! - Detect and reuse tunnels left over from a previous process generation
//! - Reclaim stale tunnels (graceful then forceful kill)
//! - Spawn a fresh tunnel when none is available
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure business logic and data models
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: External system implementations
//! - `tunnel`: The lifecycle manager and tunnel handle
//!
//! All lifecycle decisions run under a single-writer lock, so concurrent
//! callers never race to spawn duplicate tunnels.
//!
//! # Platform Support
//! - macOS: Uses `lsof` and `ps` commands
//! - Linux: Uses `ss` and `ps` commands

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod tunnel;

// Re-export domain types (primary API)
pub use domain::ProcessDescriptor;

// Re-export other commonly used types
pub use config::{Config, ConfigStore, Mode};
pub use error::{Error, Result};
pub use tunnel::{SystemTunnelManager, TunnelHandle, TunnelManager};
