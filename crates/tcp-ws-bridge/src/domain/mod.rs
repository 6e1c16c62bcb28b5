//! Domain layer for tcp-ws-bridge.
//!
//! Pure types with no dependencies on I/O, networking, or async runtimes.
//!
//! # What belongs in the domain layer?
//!
//! - Configuration structures and their validation
//! - Session lifecycle states and the per-session summary
//!
//! # What does NOT belong here?
//!
//! - Any `tokio`, `TcpStream`, or `WebSocket` types
//! - File I/O or environment variable reading

pub mod config;
pub mod session;

pub use config::{BridgeConfig, ConfigError, TargetUrl, DEFAULT_LISTEN_HOST, DEFAULT_PORT};
pub use session::{Direction, SessionOutcome, SessionState, SessionSummary, Termination};
