//! Background receive loop and message reassembly
//!
//! Per-message state machine:
//!
//! ```text
//! Idle ──chunk──> Accumulating ──not final──> Accumulating
//!                      │
//!                    final
//!                      ▼
//!                  Dispatch ──> Idle
//! ```
//!
//! A close frame in any state ends the loop: the close handshake is completed,
//! `Disconnected` is emitted, and bytes accumulated for an in-flight message
//! are discarded silently. A read error emits `ListenerError` and ends the
//! loop without `Disconnected`, so peer-initiated close and transport failure
//! stay distinguishable at the public boundary. Cancellation (caller token or
//! dispose) ends the loop with no event at all.

use crate::core::client::ClientEvent;
use crate::core::connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};
use crate::traits::{DuplexSocket, RawChunk};
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// The listening loop body
///
/// Runs as one background tokio task per client; `active` is cleared on every
/// exit path so a later `start_listening` begins a fresh session.
pub(crate) async fn listen_loop<S>(
    socket: Arc<S>,
    state: Arc<AtomicConnectionState>,
    metrics: Arc<AtomicMetrics>,
    events: Sender<ClientEvent>,
    chunk_size: usize,
    cancel: CancellationToken,
    shutdown: CancellationToken,
    active: Arc<AtomicBool>,
) where
    S: DuplexSocket + 'static,
{
    debug!("listen loop started (chunk size {})", chunk_size);

    // Accumulation buffer for the message currently being reassembled.
    // Grows without an explicit cap across chunks; reset on dispatch.
    let mut assembly: Vec<u8> = Vec::new();

    loop {
        let received = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("listen loop cancelled by caller");
                break;
            }
            _ = shutdown.cancelled() => {
                debug!("listen loop stopped by dispose");
                break;
            }
            result = socket.receive_chunk(chunk_size) => result,
        };

        match received {
            Ok(RawChunk::Data { bytes, is_final }) => {
                metrics.increment_chunks_received();
                assembly.extend_from_slice(&bytes);

                if !is_final {
                    continue;
                }
                if assembly.is_empty() {
                    // Empty final fragment with nothing accumulated: no
                    // spurious empty-message dispatch.
                    debug!("empty final fragment, skipping dispatch");
                    continue;
                }

                let message = std::mem::take(&mut assembly);
                debug!("dispatching message of {} bytes", message.len());
                metrics.increment_messages_received();
                let _ = events.send(ClientEvent::MessageReceived(message));
            }
            Ok(RawChunk::Close { status, reason }) => {
                info!("close frame received ({:?}): {}", status, reason);
                if !assembly.is_empty() {
                    // Partial message interrupted by close: discarded silently.
                    debug!("discarding {} buffered bytes of partial message", assembly.len());
                    assembly.clear();
                }

                state.set_if_live(ConnectionState::Closing);
                if let Err(e) = socket.close(status, &reason).await {
                    debug!("close handshake completion failed: {}", e);
                }
                state.set_if_live(ConnectionState::Disconnected);

                let _ = events.send(ClientEvent::Disconnected(status));
                break;
            }
            Err(e) => {
                error!("receive failed: {}", e);
                let _ = events.send(ClientEvent::ListenerError(e.to_string()));
                break;
            }
        }
    }

    active.store(false, Ordering::Release);
    debug!("listen loop exited");
}
