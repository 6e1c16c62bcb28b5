//! Shared fixtures for the integration tests: throwaway WebSocket servers and
//! a bridge bound to an ephemeral loopback port.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, accept_hdr_async, WebSocketStream};

use tcp_ws_bridge::domain::{BridgeConfig, TargetUrl};
use tcp_ws_bridge::infrastructure::Listener;

/// Upper bound for anything a test waits on.
pub const STEP_TIMEOUT: Duration = Duration::from_secs(2);

pub type ServerWs = WebSocketStream<TcpStream>;

/// Starts a WebSocket server on `127.0.0.1:0` that runs `handler` for every
/// connection that completes the handshake.
pub async fn spawn_ws_server<F, Fut>(handler: F) -> SocketAddr
where
    F: Fn(ServerWs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                if let Ok(ws) = accept_async(stream).await {
                    handler(ws).await;
                }
            });
        }
    });

    addr
}

/// Starts a WebSocket server that records the `Sec-WebSocket-Protocol` each
/// client requested, answers with `selected` (if any), then echoes.
pub async fn spawn_subprotocol_server(
    selected: Option<&'static str>,
) -> (SocketAddr, mpsc::UnboundedReceiver<Option<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                let callback = move |req: &Request, mut resp: Response| -> Result<Response, ErrorResponse> {
                    let requested = req
                        .headers()
                        .get(SEC_WEBSOCKET_PROTOCOL)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    let _ = tx.send(requested);
                    if let Some(name) = selected {
                        resp.headers_mut()
                            .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static(name));
                    }
                    Ok(resp)
                };
                if let Ok(ws) = accept_hdr_async(stream, callback).await {
                    echo(ws).await;
                }
            });
        }
    });

    (addr, rx)
}

/// Echoes every data message back to the sender until the connection ends.
pub async fn echo(mut ws: ServerWs) {
    while let Some(Ok(msg)) = ws.next().await {
        match msg {
            Message::Binary(_) | Message::Text(_) => {
                if ws.send(msg).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
}

/// Reads data messages until the peer closes, returning each payload.
pub async fn collect_until_close(mut ws: ServerWs) -> Vec<Vec<u8>> {
    let mut messages = Vec::new();
    while let Some(Ok(msg)) = ws.next().await {
        match msg {
            Message::Binary(data) => messages.push(data),
            Message::Text(text) => messages.push(text.into_bytes()),
            Message::Close(_) => break,
            _ => {}
        }
    }
    messages
}

/// Returns a URL for a loopback port that nothing is listening on.
pub async fn dead_ws_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{addr}/")
}

/// Config for a bridge on an ephemeral loopback port targeting `url`.
pub fn bridge_config(url: &str, subprotocol: Option<&str>) -> BridgeConfig {
    let mut cfg = BridgeConfig::new(TargetUrl::parse(url).unwrap());
    cfg.listen_host = "127.0.0.1".to_string();
    cfg.listen_port = 0;
    cfg.subprotocol = subprotocol.map(str::to_string);
    cfg
}

/// A running bridge. The listener stops when this is dropped.
pub struct RunningBridge {
    pub addr: SocketAddr,
    _shutdown: oneshot::Sender<()>,
}

/// Binds and serves a bridge in the background.
pub async fn start_bridge(url: &str, subprotocol: Option<&str>) -> RunningBridge {
    let listener = Listener::bind(bridge_config(url, subprotocol)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    tokio::spawn(listener.serve(async move {
        let _ = rx.await;
    }));

    RunningBridge {
        addr,
        _shutdown: tx,
    }
}

/// Returns `(client, server, peer)` for a fresh loopback TCP connection.
pub async fn tcp_pair() -> (TcpStream, TcpStream, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let client = TcpStream::connect(addr).await.unwrap();
    let (server, peer) = listener.accept().await.unwrap();
    (client, server, peer)
}
