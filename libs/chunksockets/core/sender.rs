//! Chunked transmission of one logical message
//!
//! A payload of `n` bytes is split into `ceil(n / chunk_size)` chunks of at
//! most `chunk_size` bytes each. Chunks are awaited strictly in order, with
//! no pipelining; only the last chunk carries the final-fragment flag.

use crate::core::connection_state::AtomicMetrics;
use crate::traits::{ChunkSocketError, DuplexSocket, Result};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Drive one payload through the socket as an ordered chunk sequence
///
/// Cancellation between chunks leaves the socket's framing state undefined;
/// the caller is expected to close the connection rather than keep sending.
pub(crate) async fn transmit<S>(
    socket: &S,
    payload: &[u8],
    chunk_size: usize,
    cancel: &CancellationToken,
    metrics: &AtomicMetrics,
) -> Result<()>
where
    S: DuplexSocket + ?Sized,
{
    debug_assert!(chunk_size >= 1);
    debug_assert!(!payload.is_empty());

    let mut chunks = payload.chunks(chunk_size).peekable();
    while let Some(chunk) = chunks.next() {
        if cancel.is_cancelled() {
            debug!("send cancelled mid-sequence");
            return Err(ChunkSocketError::Cancelled);
        }
        let is_final = chunks.peek().is_none();

        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("send cancelled mid-sequence");
                return Err(ChunkSocketError::Cancelled);
            }
            result = socket.send_chunk(chunk, is_final) => result?,
        }

        metrics.increment_chunks_sent();
        debug!("sent chunk of {} bytes (final: {})", chunk.len(), is_final);
    }

    Ok(())
}
