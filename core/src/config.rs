//! Configuration for the gateway connection and tunnel placement.
//!
//! Stores configuration in JSON format at `~/.tunnelkeeper/config.json`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};
use crate::ports::SettingsPort;

/// Operating mode of the gateway connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// The gateway runs on this machine; no tunnel is needed.
    #[default]
    Local,
    /// The gateway runs on a remote host reached through an SSH tunnel.
    Remote,
}

/// Configuration data stored in JSON format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Operating mode. Tunnels are only created in remote mode.
    #[serde(default)]
    pub mode: Mode,

    /// Hostname of the remote gateway (SSH destination).
    #[serde(default, rename = "gatewayHost")]
    pub gateway_host: String,

    /// SSH user on the gateway host. Defaults to the current user.
    #[serde(default, rename = "gatewayUser")]
    pub gateway_user: Option<String>,

    /// Remote port carrying gateway control traffic.
    #[serde(default = "default_gateway_port", rename = "gatewayPort")]
    pub gateway_port: u16,

    /// Local port the tunnel should bind. Defaults to the gateway port.
    #[serde(default, rename = "localPort")]
    pub local_port: Option<u16>,

    /// Optional SSH identity file passed as `-i`.
    #[serde(default, rename = "identityFile")]
    pub identity_file: Option<PathBuf>,
}

fn default_gateway_port() -> u16 {
    18789
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Local,
            gateway_host: String::new(),
            gateway_user: None,
            gateway_port: default_gateway_port(),
            local_port: None,
            identity_file: None,
        }
    }
}

impl Config {
    /// The local port the tunnel should prefer.
    pub fn desired_local_port(&self) -> u16 {
        self.local_port.unwrap_or(self.gateway_port)
    }

    /// The SSH destination string (`user@host` or bare `host`).
    pub fn ssh_destination(&self) -> String {
        match &self.gateway_user {
            Some(user) => format!("{}@{}", user, self.gateway_host),
            None => self.gateway_host.clone(),
        }
    }
}

impl SettingsPort for Config {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn gateway_port(&self) -> u16 {
        self.gateway_port
    }

    fn preferred_local_port(&self) -> u16 {
        self.desired_local_port()
    }
}

/// Configuration store for gateway connection settings.
///
/// Handles reading and writing configuration to `~/.tunnelkeeper/config.json`.
pub struct ConfigStore {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a new config store with the default path.
    ///
    /// Default path: `~/.tunnelkeeper/config.json`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        let config_path = home.join(".tunnelkeeper").join("config.json");

        Ok(Self { config_path })
    }

    /// Create a config store with a custom path (for testing).
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> PathBuf {
        self.config_path.parent().unwrap().to_path_buf()
    }

    /// Load configuration from disk.
    ///
    /// Returns default config if the file doesn't exist. Read failures
    /// surface as [`Error::Io`], malformed JSON as [`Error::Json`].
    pub async fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.config_path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub async fn save(&self, config: &Config) -> Result<()> {
        let config_dir = self.config_dir();
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).await?;
        }

        let content = serde_json::to_string_pretty(config)?;

        // Write atomically by writing to temp file then renaming
        let temp_path = self.config_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;

        fs::rename(&temp_path, &self.config_path).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.mode, Mode::Local);
        assert_eq!(config.gateway_port, 18789);
        assert_eq!(config.desired_local_port(), 18789);
    }

    #[test]
    fn test_desired_local_port_override() {
        let config = Config {
            local_port: Some(9000),
            ..Config::default()
        };
        assert_eq!(config.desired_local_port(), 9000);
    }

    #[test]
    fn test_ssh_destination() {
        let config = Config {
            gateway_host: "gw.example.com".to_string(),
            ..Config::default()
        };
        assert_eq!(config.ssh_destination(), "gw.example.com");

        let config = Config {
            gateway_user: Some("deploy".to_string()),
            ..config
        };
        assert_eq!(config.ssh_destination(), "deploy@gw.example.com");
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config =
            serde_json::from_str(r#"{"mode": "remote", "gatewayHost": "gw"}"#).unwrap();
        assert_eq!(config.mode, Mode::Remote);
        assert_eq!(config.gateway_host, "gw");
        assert_eq!(config.gateway_port, 18789);
        assert!(config.local_port.is_none());
    }

    #[tokio::test]
    async fn test_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::with_path(dir.path().join("config.json"));

        // Missing file yields defaults
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.mode, Mode::Local);

        let config = Config {
            mode: Mode::Remote,
            gateway_host: "gw.example.com".to_string(),
            gateway_port: 18789,
            local_port: Some(28789),
            ..Config::default()
        };
        store.save(&config).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.mode, Mode::Remote);
        assert_eq!(loaded.gateway_host, "gw.example.com");
        assert_eq!(loaded.desired_local_port(), 28789);
    }

    #[tokio::test]
    async fn test_load_surfaces_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let store = ConfigStore::with_path(path);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
