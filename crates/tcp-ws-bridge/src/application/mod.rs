//! Application layer for tcp-ws-bridge.
//!
//! Holds the one piece of logic shared by both copy directions: the byte
//! pump. It is written against two small traits, [`ChunkSource`] and
//! [`ChunkSink`], so it never sees a socket; the infrastructure layer adapts
//! TCP halves and WebSocket halves to those traits.

pub mod pump;

pub use pump::{pump, ChunkSink, ChunkSource, PumpError, MAX_CHUNK_SIZE};
