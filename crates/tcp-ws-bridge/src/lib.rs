//! tcp-ws-bridge library crate.
//!
//! Accepts plain TCP connections and relays their byte stream to and from a
//! WebSocket endpoint, so a TCP-only client can talk to a WebSocket-only
//! server.
//!
//! # Architecture
//!
//! ```text
//! TCP client (raw bytes)
//!         ↕
//! [tcp-ws-bridge]
//!   ├── domain/           Pure types: BridgeConfig, TargetUrl, session states
//!   ├── application/      The byte pump (source → sink copy loop)
//!   └── infrastructure/
//!         ├── listener/   TCP accept loop, one Session per connection
//!         ├── session/    Handshake, pump race, teardown
//!         ├── ws_connect/ Outbound WebSocket handshake (tokio-tungstenite)
//!         ├── tcp_io/     TCP halves as pump source/sink
//!         └── ws_io/      WebSocket halves as pump source/sink
//!         ↕
//! WebSocket server (ws:// or wss://)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` depends on `domain` only and knows nothing about sockets.
//! - `infrastructure` depends on all other layers plus `tokio` and `tungstenite`.

/// Domain layer: configuration and session lifecycle types (no I/O).
pub mod domain;

/// Application layer: the generic byte pump.
pub mod application;

/// Infrastructure layer: listener, session, and the TCP/WebSocket adapters.
pub mod infrastructure;
