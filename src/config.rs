//! Configuration loading.
//!
//! Defaults point at the device the tool was written for. They can be
//! overridden by a JSON file, then by `PIXELBLAZE_*` environment variables,
//! then by command-line flags (applied by the binaries).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::constants;
use crate::handshake::HandshakeMode;

/// Connection and timing settings for a session.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Device host name or IP address.
    pub host: String,
    /// Device WebSocket port.
    pub port: u16,
    /// Request path used in the upgrade request.
    pub path: String,
    /// Verify status line and Sec-WebSocket-Accept.
    pub strict_handshake: bool,
    /// TCP connect timeout in milliseconds (`None` blocks).
    pub connect_timeout_ms: Option<u64>,
    /// Socket read timeout during the handshake (`None` blocks).
    pub read_timeout_ms: Option<u64>,
    /// Delay after each frame in the one-shot CLI.
    pub oneshot_settle_ms: u64,
    /// Delay after each frame in the bridge loop.
    pub bridge_settle_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: constants::DEFAULT_HOST.to_string(),
            port: constants::DEFAULT_PORT,
            path: "/".to_string(),
            strict_handshake: false,
            connect_timeout_ms: None,
            read_timeout_ms: None,
            oneshot_settle_ms: constants::ONESHOT_SETTLE_DELAY.as_millis() as u64,
            bridge_settle_ms: constants::BRIDGE_SETTLE_DELAY.as_millis() as u64,
        }
    }
}

impl Config {
    /// Path of the JSON config file.
    ///
    /// `PIXELBLAZE_CONFIG` wins; otherwise `<config dir>/pixelblaze/config.json`.
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("PIXELBLAZE_CONFIG") {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("pixelblaze").join("config.json"))
    }

    /// Defaults, then the config file (if present), then environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse a JSON config file. Missing fields take their defaults.
    pub fn load_from_file(path: &std::path::Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {} as JSON", path.display()))
    }

    /// Apply `PIXELBLAZE_*` variables. Unparsable numbers are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("PIXELBLAZE_HOST") {
            self.host = host;
        }

        if let Ok(port) = std::env::var("PIXELBLAZE_PORT") {
            match port.parse::<u16>() {
                Ok(port) => self.port = port,
                Err(_) => log::warn!("Ignoring invalid PIXELBLAZE_PORT={}", port),
            }
        }

        if let Ok(path) = std::env::var("PIXELBLAZE_PATH") {
            self.path = path;
        }

        if let Ok(strict) = std::env::var("PIXELBLAZE_STRICT_HANDSHAKE") {
            self.strict_handshake = matches!(
                strict.to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        if let Ok(timeout) = std::env::var("PIXELBLAZE_TIMEOUT_MS") {
            match timeout.parse::<u64>() {
                Ok(ms) => self.set_timeout_ms(ms),
                Err(_) => log::warn!("Ignoring invalid PIXELBLAZE_TIMEOUT_MS={}", timeout),
            }
        }
    }

    /// Set both connect and read timeouts; 0 restores blocking behavior.
    pub fn set_timeout_ms(&mut self, ms: u64) {
        let timeout = (ms > 0).then_some(ms);
        self.connect_timeout_ms = timeout;
        self.read_timeout_ms = timeout;
    }

    /// `host:port` as dialed.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Handshake validation mode.
    pub fn handshake_mode(&self) -> HandshakeMode {
        if self.strict_handshake {
            HandshakeMode::Strict
        } else {
            HandshakeMode::Lenient
        }
    }

    /// Connect timeout as a `Duration`.
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    /// Read timeout as a `Duration`.
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }

    /// Post-send delay for the one-shot CLI.
    pub fn oneshot_settle(&self) -> Duration {
        Duration::from_millis(self.oneshot_settle_ms)
    }

    /// Post-send delay for the bridge loop.
    pub fn bridge_settle(&self) -> Duration {
        Duration::from_millis(self.bridge_settle_ms)
    }
}
