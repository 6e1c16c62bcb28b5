//! WebSocket halves adapted to the pump's source/sink traits.
//!
//! The bridge treats the WebSocket as a plain byte stream:
//!
//! - Outbound, every chunk becomes one binary message. Message boundaries
//!   are an artifact of the TCP read size and carry no meaning.
//! - Inbound, binary payloads (and the UTF-8 bytes of text payloads) are
//!   passed through unchanged and concatenate on the TCP side. An empty
//!   payload ends the stream, like a Close frame. Control frames are
//!   consumed here; tungstenite answers pings on its own.

use async_trait::async_trait;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tracing::{debug, trace};

use crate::application::{ChunkSink, ChunkSource};

/// Pulls message payloads from the read side of a WebSocket.
pub struct WsSource<S> {
    stream: S,
}

impl<S> WsSource<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl<S> ChunkSource for WsSource<S>
where
    S: Stream<Item = Result<WsMessage, WsError>> + Unpin + Send,
{
    type Error = WsError;

    async fn read_chunk(&mut self) -> Result<Option<Vec<u8>>, WsError> {
        loop {
            let msg = match self.stream.next().await {
                Some(Ok(msg)) => msg,
                Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) | None => {
                    debug!("websocket stream ended");
                    return Ok(None);
                }
                Some(Err(e)) => return Err(e),
            };

            match msg {
                WsMessage::Binary(data) if !data.is_empty() => return Ok(Some(data)),
                WsMessage::Text(text) if !text.is_empty() => return Ok(Some(text.into_bytes())),
                WsMessage::Binary(_) | WsMessage::Text(_) => {
                    debug!("empty websocket message; treating as end of stream");
                    return Ok(None);
                }
                WsMessage::Close(frame) => {
                    debug!("websocket Close frame received: {frame:?}");
                    return Ok(None);
                }
                WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => {
                    trace!("skipping websocket control frame");
                }
            }
        }
    }
}

/// Sends each chunk as one binary message on the write side of a WebSocket.
pub struct WsSink<S> {
    sink: S,
    sent: u64,
}

impl<S> WsSink<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, sent: 0 }
    }

    /// Total payload bytes accepted by the WebSocket so far.
    pub fn bytes_sent(&self) -> u64 {
        self.sent
    }
}

#[async_trait]
impl<S> ChunkSink for WsSink<S>
where
    S: Sink<WsMessage, Error = WsError> + Unpin + Send,
{
    type Error = WsError;

    async fn write_chunk(&mut self, chunk: Vec<u8>) -> Result<(), WsError> {
        let len = chunk.len() as u64;
        // `send` flushes, so the write only completes once the frame is on the wire.
        self.sink.send(WsMessage::Binary(chunk)).await?;
        self.sent += len;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
