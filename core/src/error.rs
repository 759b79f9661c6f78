//! Error types for the tunnelkeeper-core library.

use thiserror::Error;

/// Result type alias for tunnelkeeper operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while managing the control tunnel.
///
/// Transient failures (health probes, kill attempts) are not represented
/// here; they are logged and drive the reclaim/recreate state machine.
#[derive(Error, Debug)]
pub enum Error {
    /// A tunnel was requested while not running in remote mode.
    #[error("remote mode is not enabled")]
    RemoteModeDisabled,

    /// The transport failed to establish a tunnel.
    #[error("failed to establish tunnel: {0}")]
    Spawn(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
