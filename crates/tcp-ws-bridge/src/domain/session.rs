//! Session lifecycle types.
//!
//! A session moves through a fixed sequence of states:
//!
//! ```text
//! Created ─▶ HandshakePending ─▶ Bridging ─▶ Draining ─▶ Closed
//!                   │                                      ▲
//!                   └──────────── handshake failed ────────┘
//! ```
//!
//! The states are internal to one session's control flow; nothing outside the
//! session can observe them. What the outside world does see is the
//! [`SessionOutcome`] returned when the session is over.

use std::fmt;

/// Lifecycle state of one bridged connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// TCP connection accepted, nothing else done yet.
    Created,
    /// Waiting for the WebSocket upgrade to complete.
    HandshakePending,
    /// Both pumps running.
    Bridging,
    /// One pump finished; cancelling the other and closing both endpoints.
    Draining,
    /// Both endpoints closed. Terminal.
    Closed,
}

impl SessionState {
    /// Returns `true` if moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Created, HandshakePending)
                | (HandshakePending, Bridging)
                | (HandshakePending, Closed)
                | (Bridging, Draining)
                | (Draining, Closed)
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Created => "created",
            SessionState::HandshakePending => "handshake-pending",
            SessionState::Bridging => "bridging",
            SessionState::Draining => "draining",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// One of the two copy directions inside a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Bytes read from the TCP client, sent as WebSocket messages.
    TcpToWs,
    /// WebSocket message payloads, written to the TCP client.
    WsToTcp,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::TcpToWs => f.write_str("tcp->ws"),
            Direction::WsToTcp => f.write_str("ws->tcp"),
        }
    }
}

/// How the first pump to finish ended.
///
/// Both variants lead to the same teardown; they differ only in how the
/// session reports them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The source reported a clean end of stream.
    Eof,
    /// A read or write failed; the message is the rendered error.
    Failed(String),
}

impl Termination {
    /// `true` for [`Termination::Eof`].
    pub fn is_clean(&self) -> bool {
        matches!(self, Termination::Eof)
    }
}

/// What a bridged session did, reported when it closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// The direction whose pump finished first.
    pub first_finished: Direction,
    /// How that pump finished.
    pub termination: Termination,
    /// Bytes accepted by the WebSocket sink.
    pub tcp_to_ws_bytes: u64,
    /// Bytes accepted by the TCP sink.
    pub ws_to_tcp_bytes: u64,
}

/// Final result of one session. Never an error: every failure is contained
/// within the session and only shows up here and in the logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The WebSocket handshake failed; no pump was started.
    HandshakeFailed(String),
    /// The bridge ran and was torn down.
    Bridged(SessionSummary),
}

// ── Tests ─────────────────────────────────────────────────────────────────────
