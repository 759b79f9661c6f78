//! Tunnel handle: one live forwarding process plus its local port.

use tracing::debug;

/// Trait for the process side of a tunnel handle.
///
/// Object-safe so the lifecycle manager can be exercised without spawning
/// real processes. The ssh adapter implements it over a `tokio` child.
pub trait TunnelProcess: Send {
    /// OS pid of the forwarding process, if still known.
    fn pid(&self) -> Option<u32>;

    /// Whether the process is still running (non-blocking check).
    fn is_running(&mut self) -> bool;

    /// Request termination. Best-effort and idempotent.
    fn terminate(&mut self);
}

/// One live forwarding tunnel.
///
/// Exclusively owned by the lifecycle manager; the local port never changes
/// for the life of the handle. The underlying process is terminated when
/// the handle is dropped, so no exit path leaks a forwarder.
pub struct TunnelHandle {
    process: Box<dyn TunnelProcess>,
    local_port: u16,
    remote_port: u16,
    terminated: bool,
}

impl TunnelHandle {
    /// Create a handle for a freshly spawned tunnel.
    pub fn new(process: Box<dyn TunnelProcess>, local_port: u16, remote_port: u16) -> Self {
        Self {
            process,
            local_port,
            remote_port,
            terminated: false,
        }
    }

    /// The local port this tunnel is bound to.
    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    /// The remote port this tunnel forwards.
    pub fn remote_port(&self) -> u16 {
        self.remote_port
    }

    /// Pid of the forwarding process, if known.
    pub fn pid(&self) -> Option<u32> {
        self.process.pid()
    }

    /// Whether the forwarding process is still running.
    pub fn is_running(&mut self) -> bool {
        !self.terminated && self.process.is_running()
    }

    /// Terminate the forwarding process.
    pub fn terminate(&mut self) {
        if !self.terminated {
            debug!(port = self.local_port, "terminating tunnel process");
            self.process.terminate();
            self.terminated = true;
        }
    }
}

impl Drop for TunnelHandle {
    fn drop(&mut self) {
        self.terminate();
    }
}

impl std::fmt::Debug for TunnelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TunnelHandle")
            .field("pid", &self.process.pid())
            .field("local_port", &self.local_port)
            .field("remote_port", &self.remote_port)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct FakeProcess {
        running: Arc<AtomicBool>,
    }

    impl TunnelProcess for FakeProcess {
        fn pid(&self) -> Option<u32> {
            Some(4242)
        }

        fn is_running(&mut self) -> bool {
            self.running.load(Ordering::SeqCst)
        }

        fn terminate(&mut self) {
            self.running.store(false, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_terminate_stops_process() {
        let running = Arc::new(AtomicBool::new(true));
        let mut handle = TunnelHandle::new(
            Box::new(FakeProcess {
                running: running.clone(),
            }),
            28789,
            18789,
        );

        assert_eq!(handle.local_port(), 28789);
        assert_eq!(handle.remote_port(), 18789);
        assert_eq!(handle.pid(), Some(4242));
        assert!(handle.is_running());
        handle.terminate();
        assert!(!handle.is_running());
        assert!(!running.load(Ordering::SeqCst));
    }

    #[test]
    fn test_drop_terminates_process() {
        let running = Arc::new(AtomicBool::new(true));
        {
            let _handle = TunnelHandle::new(
                Box::new(FakeProcess {
                    running: running.clone(),
                }),
                18789,
                18789,
            );
        }
        assert!(!running.load(Ordering::SeqCst));
    }
}
