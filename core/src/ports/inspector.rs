//! Port/process inspector port (interface).

use crate::domain::ProcessDescriptor;

/// Port for inspecting local listeners and probing their health.
///
/// This trait defines the interface for OS-level port inspection.
/// Implementations handle platform-specific details (ss, lsof, ps).
pub trait PortInspectorPort: Send + Sync {
    /// Describe the process listening on a local port, if any.
    ///
    /// Lookup failures are logged by the implementation and reported as
    /// "nothing listening".
    fn describe(
        &self,
        port: u16,
    ) -> impl std::future::Future<Output = Option<ProcessDescriptor>> + Send;

    /// Application-level health probe against a local port.
    ///
    /// A listener that accepts connections but does not answer the probe
    /// within a bounded time is unhealthy.
    fn probe_health(&self, port: u16) -> impl std::future::Future<Output = bool> + Send;

    /// Drop any bookkeeping record held for a pid.
    ///
    /// Best-effort cache invalidation after a kill, so future lookups do
    /// not resurface the process. Intentionally has no failure path.
    fn remove_record(&self, pid: i32) -> impl std::future::Future<Output = ()> + Send;
}
