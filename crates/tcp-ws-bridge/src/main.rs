//! tcp-ws-bridge — entry point.
//!
//! Accepts plain TCP connections and bridges each one to a WebSocket
//! endpoint. It is the reverse of websockify: it adds WebSocket support to a
//! client that only speaks raw TCP.
//!
//! Only a plain byte stream is carried. WebSocket message framing is not
//! conveyed back to the TCP client. Most servers need the right subprotocol.
//! For example, to let a Mosquitto instance bridge to a broker that only
//! exposes MQTT over WebSockets:
//!
//! ```text
//! tcp-ws-bridge --port 13232 --subproto mqtt wss://server/
//! ```
//!
//! and point the client at `127.0.0.1:13232`.
//!
//! # Usage
//!
//! ```text
//! tcp-ws-bridge [OPTIONS] [URL]
//!
//! Options:
//!   -p, --port <PORT>                TCP listen port [default: 13232]
//!   -l, --listen <ADDR>              TCP listen address [default: 0.0.0.0]
//!   -s, --subproto <SUBPROTO>        WebSocket subprotocol
//!       --handshake-timeout <SECS>   Abort handshakes slower than this
//!   -c, --config <FILE>              TOML config file
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                    | Option                |
//! |-----------------------------|-----------------------|
//! | `BRIDGE_URL`                | `URL`                 |
//! | `BRIDGE_PORT`               | `--port`              |
//! | `BRIDGE_LISTEN`             | `--listen`            |
//! | `BRIDGE_SUBPROTO`           | `--subproto`          |
//! | `BRIDGE_HANDSHAKE_TIMEOUT`  | `--handshake-timeout` |
//! | `BRIDGE_CONFIG`             | `--config`            |
//!
//! Precedence: command line, then environment, then config file, then the
//! built-in default.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tcp_ws_bridge::domain::{BridgeConfig, TargetUrl, DEFAULT_LISTEN_HOST, DEFAULT_PORT};
use tcp_ws_bridge::infrastructure::config_file::FileConfig;
use tcp_ws_bridge::infrastructure::run_server;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// TCP to WebSocket bridge.
///
/// Accepts plain TCP connections and relays each one's byte stream to and
/// from a WebSocket server.
#[derive(Debug, Parser)]
#[command(
    name = "tcp-ws-bridge",
    about = "Bridges plain TCP clients to a WebSocket server",
    version
)]
struct Cli {
    /// TCP listen port.
    #[arg(short, long, value_name = "PORT", env = "BRIDGE_PORT")]
    port: Option<u16>,

    /// TCP listen address (IP or host name).
    #[arg(short, long, value_name = "ADDR", env = "BRIDGE_LISTEN")]
    listen: Option<String>,

    /// WebSocket subprotocol to request during the handshake.
    #[arg(short, long, value_name = "SUBPROTO", env = "BRIDGE_SUBPROTO")]
    subproto: Option<String>,

    /// Give up on a WebSocket handshake after this many seconds (0 = never).
    #[arg(long, value_name = "SECS", env = "BRIDGE_HANDSHAKE_TIMEOUT")]
    handshake_timeout: Option<u64>,

    /// Read additional settings from this TOML file.
    #[arg(short, long, value_name = "FILE", env = "BRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// WebSocket URL (ws://... or wss://...).
    #[arg(value_name = "URL", env = "BRIDGE_URL")]
    url: Option<String>,
}

impl Cli {
    /// Loads the config file (if any) and merges it under the CLI values.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or if
    /// the merged settings are invalid.
    fn into_bridge_config(self) -> anyhow::Result<BridgeConfig> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)
                .with_context(|| format!("failed to load config file {}", path.display()))?,
            None => FileConfig::default(),
        };
        self.merge(file)
    }

    /// Merges CLI values over `file` values over built-in defaults.
    fn merge(self, file: FileConfig) -> anyhow::Result<BridgeConfig> {
        let url = self
            .url
            .or(file.url)
            .context("a WebSocket URL is required (positional URL, BRIDGE_URL, or `url` in the config file)")?;
        let target_url = TargetUrl::parse(&url)?;

        let config = BridgeConfig {
            listen_host: self
                .listen
                .or(file.listen)
                .unwrap_or_else(|| DEFAULT_LISTEN_HOST.to_string()),
            listen_port: self.port.or(file.port).unwrap_or(DEFAULT_PORT),
            target_url,
            // An empty name means "no subprotocol", same as leaving it out.
            subprotocol: self.subproto.or(file.subproto).filter(|s| !s.is_empty()),
            handshake_timeout: self
                .handshake_timeout
                .or(file.handshake_timeout_secs)
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        };
        config.validate()?;
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// 1. Initialise `tracing_subscriber`; `RUST_LOG` controls the level
///    (default `info`).
/// 2. Parse the CLI and build a [`BridgeConfig`].
/// 3. Serve until Ctrl+C. Only a bind failure ends the process with an error.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_bridge_config()?;

    run_server(config, shutdown_signal()).await?;

    info!("tcp-ws-bridge stopped");
    Ok(())
}

/// Resolves on Ctrl+C (SIGINT). If the signal handler cannot be installed the
/// bridge keeps running until the process is killed.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received Ctrl+C; shutting down"),
        Err(e) => {
            error!("failed to listen for Ctrl+C signal: {e}");
            std::future::pending::<()>().await;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
