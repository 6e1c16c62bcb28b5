//! One bridged connection: handshake, pump race, teardown.
//!
//! # Lifecycle
//!
//! 1. Log the accepted TCP connection.
//! 2. Open the WebSocket to the target. On failure, log it, close the TCP
//!    connection and stop: no pump ever runs.
//! 3. Run both pumps (TCP→WS and WS→TCP) concurrently.
//! 4. As soon as *either* pump finishes, cleanly or with an error, drop the
//!    other one.
//! 5. Close the WebSocket and the TCP connection and log the summary.
//!
//! # Cancellation
//!
//! Both pumps are polled by one `tokio::select!` inside this task. When one
//! completes, `select!` drops the other pump's future on the spot. That
//! abandons whatever read or write it was parked on (tokio socket reads and
//! tungstenite stream/sink polls hold no partial state across an await), so
//! the loser can never issue another I/O call. Because the pumps only
//! *borrow* the connection halves, the session still owns both connections
//! afterwards and can close them explicitly.
//!
//! No error ever leaves [`Session::run`]; the caller only gets a
//! [`SessionOutcome`] for its own bookkeeping.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::application::pump;
use crate::domain::{
    BridgeConfig, Direction, SessionOutcome, SessionState, SessionSummary, Termination,
};
use crate::infrastructure::tcp_io::{TcpSink, TcpSource};
use crate::infrastructure::ws_connect::{self, WsStream};
use crate::infrastructure::ws_io::{WsSink, WsSource};

/// Longest time spent sending the WebSocket Close frame during teardown.
pub const WS_CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

/// A single TCP client bridged to a single WebSocket connection.
pub struct Session {
    id: Uuid,
    peer: SocketAddr,
    config: Arc<BridgeConfig>,
    state: SessionState,
}

impl Session {
    /// Creates a session for a connection just accepted from `peer`.
    pub fn new(peer: SocketAddr, config: Arc<BridgeConfig>) -> Self {
        Self {
            id: Uuid::new_v4(),
            peer,
            config,
            state: SessionState::Created,
        }
    }

    /// Unique id used to correlate this session's log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Runs the session to completion, consuming it.
    ///
    /// All logging happens inside a `session` span carrying the session id
    /// and the peer address.
    pub async fn run(self, tcp: TcpStream) -> SessionOutcome {
        let span = info_span!("session", id = %self.id, peer = %self.peer);
        self.bridge(tcp).instrument(span).await
    }

    async fn bridge(mut self, mut tcp: TcpStream) -> SessionOutcome {
        info!("connected");

        // ── Handshake ──────────────────────────────────────────────────────────
        self.advance(SessionState::HandshakePending);
        let config = Arc::clone(&self.config);
        let handshake = ws_connect::connect(
            &config.target_url,
            config.subprotocol.as_deref(),
            config.handshake_timeout,
        )
        .await;

        let mut ws = match handshake {
            Ok(ws) => ws,
            Err(e) => {
                error!("websocket handshake failed: {e}");
                close_tcp(&mut tcp).await;
                self.advance(SessionState::Closed);
                info!("closed");
                return SessionOutcome::HandshakeFailed(e.to_string());
            }
        };

        info!(
            tls = config.target_url.is_secure(),
            "connected to {}", config.target_url
        );

        // ── Bridging ───────────────────────────────────────────────────────────
        self.advance(SessionState::Bridging);
        let summary = race_pumps(&mut tcp, &mut ws).await;

        match &summary.termination {
            Termination::Eof => {
                debug!("{} reached end of stream", summary.first_finished);
            }
            Termination::Failed(reason) => {
                warn!("{} failed: {reason}", summary.first_finished);
            }
        }

        // ── Draining ───────────────────────────────────────────────────────────
        self.advance(SessionState::Draining);
        close_ws(&mut ws).await;
        close_tcp(&mut tcp).await;

        self.advance(SessionState::Closed);
        info!(
            first_finished = %summary.first_finished,
            clean = summary.termination.is_clean(),
            tcp_to_ws_bytes = summary.tcp_to_ws_bytes,
            ws_to_tcp_bytes = summary.ws_to_tcp_bytes,
            "closed"
        );

        SessionOutcome::Bridged(summary)
    }

    fn advance(&mut self, next: SessionState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal session transition {} -> {}",
            self.state,
            next
        );
        debug!("state {} -> {}", self.state, next);
        self.state = next;
    }
}

/// Runs both pumps until the first one finishes, then drops the other.
///
/// Returns once the loser has been dropped, so on return no pump holds a
/// borrow of either connection.
async fn race_pumps(tcp: &mut TcpStream, ws: &mut WsStream) -> SessionSummary {
    let (tcp_read, tcp_write) = tcp.split();
    let (ws_write, ws_read) = ws.split::<WsMessage>();

    let mut tcp_source = TcpSource::new(tcp_read);
    let mut ws_sink = WsSink::new(ws_write);
    let mut ws_source = WsSource::new(ws_read);
    let mut tcp_sink = TcpSink::new(tcp_write);

    let (first_finished, termination) = tokio::select! {
        result = pump(&mut tcp_source, &mut ws_sink) => (Direction::TcpToWs, termination_of(result)),
        result = pump(&mut ws_source, &mut tcp_sink) => (Direction::WsToTcp, termination_of(result)),
    };

    SessionSummary {
        first_finished,
        termination,
        tcp_to_ws_bytes: ws_sink.bytes_sent(),
        ws_to_tcp_bytes: tcp_sink.bytes_written(),
    }
}

fn termination_of<E: std::fmt::Display>(result: Result<u64, E>) -> Termination {
    match result {
        Ok(_) => Termination::Eof,
        Err(e) => Termination::Failed(e.to_string()),
    }
}

/// Sends a Close frame if the WebSocket is still open. Safe to call on a
/// connection the peer already closed.
///
/// Bounded by [`WS_CLOSE_TIMEOUT`]: a peer that stopped reading cannot hold
/// the session open; the socket is dropped either way.
async fn close_ws(ws: &mut WsStream) {
    match tokio::time::timeout(WS_CLOSE_TIMEOUT, ws.close(None)).await {
        Ok(Ok(())) => debug!("websocket closed"),
        Ok(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) => {
            debug!("websocket already closed");
        }
        Ok(Err(e)) => debug!("websocket close failed: {e}"),
        Err(_) => debug!("websocket close timed out after {WS_CLOSE_TIMEOUT:?}"),
    }
}

/// Shuts down the TCP write side. Safe to call on a reset or closed socket;
/// the descriptor itself is released when the stream is dropped.
async fn close_tcp(tcp: &mut TcpStream) {
    if let Err(e) = tcp.shutdown().await {
        debug!("tcp shutdown failed: {e}");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
