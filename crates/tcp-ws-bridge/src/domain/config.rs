//! Bridge configuration types.
//!
//! [`BridgeConfig`] holds every runtime setting. It is built once at startup
//! (from CLI arguments, environment variables and an optional config file, see
//! `main.rs`) and shared read-only with every session through an `Arc`.
//!
//! Keeping configuration as a plain struct (no global state, no environment
//! reads inside the domain) lets tests build a config for an ephemeral port
//! without touching the process environment.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// TCP port the bridge listens on when none is configured.
pub const DEFAULT_PORT: u16 = 13232;

/// Listen address used when none is configured (all IPv4 interfaces).
pub const DEFAULT_LISTEN_HOST: &str = "0.0.0.0";

/// Errors raised while validating configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The target URL has no `scheme://` prefix.
    #[error("invalid WebSocket URL '{0}': missing scheme (expected ws:// or wss://)")]
    MissingScheme(String),

    /// The target URL uses a scheme other than `ws` or `wss`.
    #[error("invalid WebSocket URL '{url}': unsupported scheme '{scheme}' (expected ws or wss)")]
    UnsupportedScheme { url: String, scheme: String },

    /// The target URL has an empty authority section.
    #[error("invalid WebSocket URL '{0}': missing host")]
    MissingHost(String),

    /// The listen host is empty.
    #[error("listen address must not be empty")]
    EmptyListenHost,
}

// ── TargetUrl ─────────────────────────────────────────────────────────────────

/// A validated `ws://` or `wss://` URL.
///
/// Only the scheme and the presence of a host are checked here; the full URI
/// grammar is left to the WebSocket client at handshake time.
///
/// ```rust
/// use tcp_ws_bridge::domain::TargetUrl;
///
/// let url = TargetUrl::parse("wss://broker.example.com/mqtt").unwrap();
/// assert!(url.is_secure());
/// assert!(TargetUrl::parse("http://example.com/").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl {
    raw: String,
    secure: bool,
}

impl TargetUrl {
    /// Parses and validates a WebSocket target URL.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the scheme is missing or not `ws`/`wss`,
    /// or if the URL has no host.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();

        let (scheme, rest) = trimmed
            .split_once("://")
            .ok_or_else(|| ConfigError::MissingScheme(trimmed.to_string()))?;

        let scheme = scheme.to_ascii_lowercase();
        let secure = match scheme.as_str() {
            "ws" => false,
            "wss" => true,
            _ => {
                return Err(ConfigError::UnsupportedScheme {
                    url: trimmed.to_string(),
                    scheme,
                })
            }
        };

        let authority = rest
            .split(|c| matches!(c, '/' | '?' | '#'))
            .next()
            .unwrap_or_default();
        if authority.is_empty() {
            return Err(ConfigError::MissingHost(trimmed.to_string()));
        }

        Ok(Self {
            raw: format!("{scheme}://{rest}"),
            secure,
        })
    }

    /// The URL as it will be handed to the WebSocket client (scheme lowercased).
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// `true` for `wss://` targets (TLS).
    pub fn is_secure(&self) -> bool {
        self.secure
    }
}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// ── BridgeConfig ──────────────────────────────────────────────────────────────

/// All runtime configuration for the bridge.
///
/// # Example
///
/// ```rust
/// use tcp_ws_bridge::domain::{BridgeConfig, TargetUrl};
///
/// let cfg = BridgeConfig::new(TargetUrl::parse("ws://127.0.0.1:9001/").unwrap());
/// assert_eq!(cfg.listen_port, 13232);
/// assert_eq!(cfg.listen_host, "0.0.0.0");
/// assert!(cfg.subprotocol.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    /// Host name or IP address the TCP listener binds to.
    ///
    /// Host names are resolved at bind time, so `localhost` works as well as
    /// `127.0.0.1` or `::`.
    pub listen_host: String,

    /// TCP port the listener binds to. `0` asks the OS for an ephemeral port.
    pub listen_port: u16,

    /// The WebSocket endpoint every session connects to.
    pub target_url: TargetUrl,

    /// Subprotocol offered during the handshake, if any.
    ///
    /// When set, the server must select it or the handshake fails.
    pub subprotocol: Option<String>,

    /// Upper bound on the WebSocket handshake.
    ///
    /// `None` (the default) waits for as long as the underlying TCP/TLS stack
    /// does.
    pub handshake_timeout: Option<Duration>,
}

impl BridgeConfig {
    /// Builds a config for `target_url` with every other field at its default.
    pub fn new(target_url: TargetUrl) -> Self {
        Self {
            listen_host: DEFAULT_LISTEN_HOST.to_string(),
            listen_port: DEFAULT_PORT,
            target_url,
            subprotocol: None,
            handshake_timeout: None,
        }
    }

    /// Checks the fields that [`TargetUrl`] does not already guarantee.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyListenHost`] if `listen_host` is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen_host.trim().is_empty() {
            return Err(ConfigError::EmptyListenHost);
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
