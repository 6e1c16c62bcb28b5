//! The byte pump: a unidirectional copy loop.
//!
//! ```text
//! loop {
//!     chunk = source.read_chunk()     // None → clean EOF, return
//!     sink.write_chunk(chunk)         // awaited before the next read
//! }
//! ```
//!
//! Awaiting every write before issuing the next read is what carries
//! backpressure from a slow sink back to the source. At most one chunk (at
//! most [`MAX_CHUNK_SIZE`] bytes) is in flight per pump.
//!
//! The pump closes nothing on exit. Tearing down the endpoints is the
//! session's job, since only the session knows whether the *other* direction
//! is still running.

use std::error::Error as StdError;

use async_trait::async_trait;
use thiserror::Error;

/// Largest chunk a source may return from one read (64 KiB).
pub const MAX_CHUNK_SIZE: usize = 64 * 1024;

/// Something the pump can pull byte chunks from.
#[async_trait]
pub trait ChunkSource: Send {
    /// Error raised by a failed read.
    type Error: StdError + Send + Sync + 'static;

    /// Returns the next chunk, or `Ok(None)` at clean end of stream.
    ///
    /// Implementations must not return more than [`MAX_CHUNK_SIZE`] bytes.
    /// An empty chunk is treated as end of stream by [`pump`].
    async fn read_chunk(&mut self) -> Result<Option<Vec<u8>>, Self::Error>;
}

/// Something the pump can push byte chunks into.
#[async_trait]
pub trait ChunkSink: Send {
    /// Error raised by a failed write.
    type Error: StdError + Send + Sync + 'static;

    /// Hands one chunk to the sink, returning once the sink has accepted it.
    async fn write_chunk(&mut self, chunk: Vec<u8>) -> Result<(), Self::Error>;
}

/// Which side of a pump failed, carrying the underlying error unchanged.
#[derive(Debug, Error)]
pub enum PumpError<R, W> {
    /// The source's read failed.
    #[error("read failed: {0}")]
    Read(R),

    /// The sink's write failed.
    #[error("write failed: {0}")]
    Write(W),
}

/// Copies chunks from `source` to `sink` until the source reports end of
/// stream.
///
/// Returns the number of bytes the sink accepted.
///
/// # Errors
///
/// The first read or write error ends the loop and is returned as
/// [`PumpError::Read`] or [`PumpError::Write`]. Nothing is retried.
///
/// # Cancellation
///
/// Dropping the returned future abandons the pending read or write at its
/// await point; no further I/O is issued after that.
pub async fn pump<S, K>(
    source: &mut S,
    sink: &mut K,
) -> Result<u64, PumpError<S::Error, K::Error>>
where
    S: ChunkSource + ?Sized,
    K: ChunkSink + ?Sized,
{
    let mut copied: u64 = 0;

    loop {
        let chunk = match source.read_chunk().await.map_err(PumpError::Read)? {
            Some(chunk) if !chunk.is_empty() => chunk,
            _ => return Ok(copied),
        };

        let len = chunk.len() as u64;
        sink.write_chunk(chunk).await.map_err(PumpError::Write)?;
        copied += len;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
