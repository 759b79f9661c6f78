//! Process descriptor domain model.

use serde::Serialize;

/// Information about the process owning a listening port.
///
/// Transient value produced by the port inspector; never owned or mutated
/// by the lifecycle manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessDescriptor {
    /// Process ID of the listener.
    pub pid: i32,

    /// Full command line that started the process.
    pub command: String,

    /// Path to the executable, when the platform can resolve it.
    pub executable: Option<String>,
}

impl ProcessDescriptor {
    /// Create a new descriptor.
    pub fn new(pid: i32, command: impl Into<String>, executable: Option<String>) -> Self {
        Self {
            pid,
            command: command.into(),
            executable,
        }
    }

    /// Whether this process looks like an SSH port forward.
    ///
    /// Case-insensitive substring match on the command line or the
    /// executable path. Heuristic: listeners that merely mention "ssh"
    /// on the control port will match, but anything that does not match
    /// is guaranteed to be left alone.
    pub fn is_ssh_forwarder(&self) -> bool {
        if self.command.to_lowercase().contains("ssh") {
            return true;
        }
        self.executable
            .as_deref()
            .map(|path| path.to_lowercase().contains("ssh"))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_ssh_in_command() {
        let desc = ProcessDescriptor::new(100, "ssh -N -L 18789:127.0.0.1:18789 gw", None);
        assert!(desc.is_ssh_forwarder());
    }

    #[test]
    fn test_detects_ssh_case_insensitive() {
        let desc = ProcessDescriptor::new(100, "SSH.EXE -L 18789:localhost:18789 gw", None);
        assert!(desc.is_ssh_forwarder());
    }

    #[test]
    fn test_detects_ssh_in_executable_path() {
        let desc = ProcessDescriptor::new(
            100,
            "some-wrapper --forward",
            Some("/usr/bin/ssh".to_string()),
        );
        assert!(desc.is_ssh_forwarder());
    }

    #[test]
    fn test_rejects_unrelated_process() {
        let desc = ProcessDescriptor::new(100, "node server.js", Some("/usr/bin/node".to_string()));
        assert!(!desc.is_ssh_forwarder());

        let desc = ProcessDescriptor::new(100, "nginx: master process", None);
        assert!(!desc.is_ssh_forwarder());
    }

    #[test]
    fn test_detects_autossh_wrapper() {
        let desc = ProcessDescriptor::new(100, "autossh -M 0 -N -L 18789:127.0.0.1:18789 gw", None);
        assert!(desc.is_ssh_forwarder());
    }
}
