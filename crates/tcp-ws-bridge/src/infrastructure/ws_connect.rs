//! Outbound WebSocket handshake.
//!
//! Opens the connection from the bridge to the configured `ws://` or `wss://`
//! target. `wss://` targets go through TLS (native-tls) transparently;
//! `MaybeTlsStream` hides the difference from the rest of the session.

use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Response;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::domain::TargetUrl;

/// The WebSocket stream type a session owns after a successful handshake.
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Everything that can go wrong before the first byte is bridged.
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// The URL could not be turned into an HTTP upgrade request.
    #[error("invalid request for {url}: {source}")]
    InvalidRequest {
        url: String,
        #[source]
        source: WsError,
    },

    /// The subprotocol name is not a legal header value.
    #[error("invalid subprotocol name {0:?}")]
    InvalidSubprotocol(String),

    /// DNS failure, refused connection, TLS failure, or upgrade rejected.
    #[error("handshake with {url} failed: {source}")]
    Failed {
        url: String,
        #[source]
        source: WsError,
    },

    /// The server did not select the subprotocol we offered.
    #[error("server at {url} did not accept subprotocol '{requested}'")]
    SubprotocolRejected { url: String, requested: String },

    /// The handshake did not finish within the configured limit.
    #[error("handshake with {url} timed out after {timeout:?}")]
    TimedOut { url: String, timeout: Duration },
}

/// Performs the WebSocket handshake with `target`.
///
/// When `subprotocol` is set it is offered in `Sec-WebSocket-Protocol`, and
/// the server must echo it back. When `timeout` is set the whole handshake
/// (TCP connect, TLS, HTTP upgrade) must finish within it.
///
/// # Errors
///
/// Returns a [`HandshakeError`] describing why no connection was established.
/// The caller treats every variant the same way: the session ends without
/// starting a pump.
pub async fn connect(
    target: &TargetUrl,
    subprotocol: Option<&str>,
    timeout: Option<Duration>,
) -> Result<WsStream, HandshakeError> {
    let url = target.as_str();

    let mut request = url
        .into_client_request()
        .map_err(|source| HandshakeError::InvalidRequest {
            url: url.to_string(),
            source,
        })?;

    if let Some(name) = subprotocol {
        let value = HeaderValue::from_str(name)
            .map_err(|_| HandshakeError::InvalidSubprotocol(name.to_string()))?;
        request.headers_mut().insert(SEC_WEBSOCKET_PROTOCOL, value);
    }

    let handshake = connect_async(request);
    let result = match timeout {
        Some(limit) => tokio::time::timeout(limit, handshake)
            .await
            .map_err(|_| HandshakeError::TimedOut {
                url: url.to_string(),
                timeout: limit,
            })?,
        None => handshake.await,
    };

    let (ws, response) = result.map_err(|source| HandshakeError::Failed {
        url: url.to_string(),
        source,
    })?;

    if let Some(requested) = subprotocol {
        if selected_subprotocol(&response) != Some(requested) {
            return Err(HandshakeError::SubprotocolRejected {
                url: url.to_string(),
                requested: requested.to_string(),
            });
        }
    }

    Ok(ws)
}

/// The subprotocol the server selected, if it sent a readable header.
fn selected_subprotocol(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(SEC_WEBSOCKET_PROTOCOL)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
