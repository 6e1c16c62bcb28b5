//! TCP halves adapted to the pump's source/sink traits.
//!
//! Both adapters are generic over `AsyncRead`/`AsyncWrite` so the session can
//! hand them the borrowed halves from `TcpStream::split`, and tests can hand
//! them `tokio_test::io` mocks.

use std::io;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::application::{ChunkSink, ChunkSource, MAX_CHUNK_SIZE};

/// Reads chunks of at most [`MAX_CHUNK_SIZE`] bytes from a TCP read half.
pub struct TcpSource<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R> TcpSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: vec![0u8; MAX_CHUNK_SIZE],
        }
    }
}

#[async_trait]
impl<R> ChunkSource for TcpSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    type Error = io::Error;

    async fn read_chunk(&mut self) -> Result<Option<Vec<u8>>, io::Error> {
        // `read` returns as soon as any bytes are available, and is cancel-safe.
        let n = self.reader.read(&mut self.buf).await?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(self.buf[..n].to_vec()))
    }
}

/// Writes chunks to a TCP write half, counting the bytes delivered.
pub struct TcpSink<W> {
    writer: W,
    written: u64,
}

impl<W> TcpSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Total bytes fully written so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }
}

#[async_trait]
impl<W> ChunkSink for TcpSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    type Error = io::Error;

    async fn write_chunk(&mut self, chunk: Vec<u8>) -> Result<(), io::Error> {
        self.writer.write_all(&chunk).await?;
        self.writer.flush().await?;
        self.written += chunk.len() as u64;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
