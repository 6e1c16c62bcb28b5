//! Infrastructure layer for tcp-ws-bridge.
//!
//! Everything that touches a socket or a file lives here.
//!
//! # Responsibilities
//!
//! - Binding the TCP listener and spawning one session per connection
//! - Performing the outbound WebSocket handshake
//! - Adapting TCP and WebSocket halves to the pump's source/sink traits
//! - Racing the two pumps and tearing both connections down
//! - Loading the optional TOML config file
//!
//! # What does NOT belong here?
//!
//! - The copy loop itself (that is the application layer)
//! - Config validation rules (that is the domain layer)
//! - CLI parsing (that is done in `main.rs`)

pub mod config_file;
pub mod listener;
pub mod session;
pub mod tcp_io;
pub mod ws_connect;
pub mod ws_io;

pub use listener::{run_server, Listener};
pub use session::Session;
