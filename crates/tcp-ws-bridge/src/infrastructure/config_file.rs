//! Optional TOML configuration file.
//!
//! Every key is optional; anything missing falls back to the CLI/environment
//! value or the built-in default (see `main.rs` for the precedence rules).
//!
//! ```toml
//! url = "wss://broker.example.com/mqtt"
//! subproto = "mqtt"
//! listen = "127.0.0.1"
//! port = 13232
//! handshake_timeout_secs = 10
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings read from a config file. Unknown keys are rejected so typos do
/// not silently fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// WebSocket target URL (`ws://…` or `wss://…`).
    pub url: Option<String>,
    /// TCP listen port.
    pub port: Option<u16>,
    /// TCP listen address.
    pub listen: Option<String>,
    /// WebSocket subprotocol to offer.
    pub subproto: Option<String>,
    /// Handshake timeout in seconds; `0` disables it.
    pub handshake_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigFileError::Io`] if the file cannot be read, or
    /// [`ConfigFileError::Parse`] if it is not valid TOML for this schema.
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parses TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigFileError::Parse`] on malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigFileError> {
        Ok(toml::from_str(text)?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
