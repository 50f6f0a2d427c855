use crate::core::config::ClientConfig;
use crate::core::connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};
use crate::core::{receiver, sender};
use crate::traits::*;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Notifications emitted by the client
///
/// Delivered over an unbounded crossbeam channel and consumed by the caller's
/// own loop via [`ChunkSocketClient::recv_event`] /
/// [`ChunkSocketClient::try_recv_event`]. Events fire once per complete
/// logical message, never per chunk.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// Connection opened successfully
    Connected,
    /// Peer closed the connection with the given status
    Disconnected(CloseStatus),
    /// One complete reassembled inbound message
    MessageReceived(Vec<u8>),
    /// One complete outbound message was fully transmitted
    MessageSent(Vec<u8>),
    /// The listening loop hit an unrecoverable read error and exited
    ListenerError(String),
}

/// Client metrics snapshot
#[derive(Debug, Clone)]
pub struct Metrics {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub chunks_sent: u64,
    pub chunks_received: u64,
    pub connection_state: ConnectionState,
}

/// Full-duplex, message-oriented client over a chunked duplex socket
///
/// The client owns its [`DuplexSocket`] exclusively and coordinates the two
/// directions of the connection:
/// - `send` splits one logical message into ordered chunks and drives them
///   through the socket sequentially
/// - `start_listening` spawns the one background task that reassembles
///   inbound chunks into complete messages
/// - `dispose` tears everything down idempotently; the release happens
///   exactly once no matter how many tasks race it
///
/// Concurrent `send` calls on one instance are serialized internally so two
/// messages' chunk sequences can never interleave on the wire.
///
/// # Type Parameters
/// - `S`: the duplex socket primitive
pub struct ChunkSocketClient<S>
where
    S: DuplexSocket + 'static,
{
    /// The exclusively-owned transport handle
    socket: Arc<S>,
    /// Client configuration
    config: ClientConfig,
    /// Atomic tagged connection state; `Disposed` is terminal
    state: Arc<AtomicConnectionState>,
    /// Atomic counters
    metrics: Arc<AtomicMetrics>,
    /// Event channel sender (shared with the listening loop)
    event_tx: Sender<ClientEvent>,
    /// Event channel receiver
    event_rx: Receiver<ClientEvent>,
    /// Whether a listening loop is currently running
    listener_active: Arc<AtomicBool>,
    /// Listening task handle, joined during dispose
    listener: parking_lot::Mutex<Option<JoinHandle<()>>>,
    /// Serializes concurrent sends for the duration of one chunk sequence
    send_guard: tokio::sync::Mutex<()>,
    /// Internal shutdown token, cancelled by dispose
    shutdown: CancellationToken,
}

impl<S> ChunkSocketClient<S>
where
    S: DuplexSocket + 'static,
{
    /// Create a client with the default configuration
    pub fn new(socket: S) -> Self {
        Self::build(socket, ClientConfig::default())
    }

    /// Create a client with a custom configuration
    pub fn with_config(socket: S, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(socket, config))
    }

    fn build(socket: S, config: ClientConfig) -> Self {
        let (event_tx, event_rx) = unbounded();
        Self {
            socket: Arc::new(socket),
            config,
            state: Arc::new(AtomicConnectionState::new(ConnectionState::Disconnected)),
            metrics: Arc::new(AtomicMetrics::new()),
            event_tx,
            event_rx,
            listener_active: Arc::new(AtomicBool::new(false)),
            listener: parking_lot::Mutex::new(None),
            send_guard: tokio::sync::Mutex::new(()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Open the connection
    ///
    /// Emits [`ClientEvent::Connected`] only on success; a connect failure
    /// propagates to the caller and no event fires.
    pub async fn connect(&self, url: &str, cancel: &CancellationToken) -> Result<()> {
        self.ensure_not_disposed()?;
        if url.is_empty() {
            return Err(ChunkSocketError::Configuration(
                "connect url must not be empty".to_string(),
            ));
        }
        if cancel.is_cancelled() {
            return Err(ChunkSocketError::Cancelled);
        }

        self.state.set_if_live(ConnectionState::Connecting);

        let connected = tokio::select! {
            _ = cancel.cancelled() => Err(ChunkSocketError::Cancelled),
            result = self.socket.connect(url) => result,
        };

        match connected {
            Ok(()) => {
                self.state.set_if_live(ConnectionState::Connected);
                info!("connected to {}", url);
                let _ = self.event_tx.send(ClientEvent::Connected);
                Ok(())
            }
            Err(e) => {
                self.state.set_if_live(ConnectionState::Disconnected);
                Err(e)
            }
        }
    }

    /// Send one logical message using the configured default chunk size
    pub async fn send(&self, payload: &[u8], cancel: &CancellationToken) -> Result<()> {
        self.send_with(payload, self.config.chunk_size, cancel).await
    }

    /// Send one logical message split into chunks of at most `chunk_size` bytes
    ///
    /// An empty payload is a no-op: zero chunks are transmitted and no event
    /// is raised. On full success one [`ClientEvent::MessageSent`] carrying
    /// the complete payload is emitted. Cancellation mid-sequence raises no
    /// completion event and leaves the socket's framing state undefined; the
    /// caller is expected to close the connection rather than keep sending.
    pub async fn send_with(
        &self,
        payload: &[u8],
        chunk_size: usize,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.ensure_not_disposed()?;
        if chunk_size < 1 {
            return Err(ChunkSocketError::InvalidChunkSize(chunk_size));
        }
        if payload.is_empty() {
            debug!("empty payload, nothing to send");
            return Ok(());
        }

        // One message's chunk sequence at a time; a second concurrent send
        // waits here instead of interleaving frames.
        let _serial = self.send_guard.lock().await;

        sender::transmit(self.socket.as_ref(), payload, chunk_size, cancel, &self.metrics)
            .await?;

        self.metrics.increment_messages_sent();
        let _ = self.event_tx.send(ClientEvent::MessageSent(payload.to_vec()));
        Ok(())
    }

    /// Send a close frame and await its completion
    ///
    /// Closing an already-closed connection is a pass-through no-op.
    pub async fn close(
        &self,
        status: CloseStatus,
        reason: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.ensure_not_disposed()?;
        if !self.socket.is_open() {
            debug!("close requested on already-closed connection");
            return Ok(());
        }
        if cancel.is_cancelled() {
            return Err(ChunkSocketError::Cancelled);
        }

        self.state.set_if_live(ConnectionState::Closing);

        let result = tokio::select! {
            _ = cancel.cancelled() => Err(ChunkSocketError::Cancelled),
            result = self.socket.close(status, reason) => result,
        };

        if result.is_ok() {
            self.state.set_if_live(ConnectionState::Disconnected);
            info!("close frame sent ({:?})", status);
        }
        result
    }

    /// Start the listening loop using the configured default chunk size
    pub fn start_listening(&self, cancel: CancellationToken) -> Result<()> {
        self.start_listening_with(self.config.chunk_size, cancel)
    }

    /// Spawn the background loop that reassembles inbound chunks
    ///
    /// Idempotent: a second call while a loop is already running is a silent
    /// no-op, so inbound chunks are never double-consumed. The loop runs
    /// until the peer closes, the caller cancels the token, the client is
    /// disposed, or an unrecoverable read error occurs.
    pub fn start_listening_with(
        &self,
        chunk_size: usize,
        cancel: CancellationToken,
    ) -> Result<()> {
        self.ensure_not_disposed()?;
        if chunk_size < 1 {
            return Err(ChunkSocketError::InvalidChunkSize(chunk_size));
        }

        if self
            .listener_active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("listen loop already active, ignoring start request");
            return Ok(());
        }

        let handle = tokio::spawn(receiver::listen_loop(
            Arc::clone(&self.socket),
            Arc::clone(&self.state),
            Arc::clone(&self.metrics),
            self.event_tx.clone(),
            chunk_size,
            cancel,
            self.shutdown.child_token(),
            Arc::clone(&self.listener_active),
        ));
        *self.listener.lock() = Some(handle);
        Ok(())
    }

    /// Tear the client down
    ///
    /// Safe to call any number of times from any task: a single atomic swap
    /// decides the one caller that performs the actual release. That caller
    /// cancels the internal shutdown token, releases the socket, and joins
    /// the listening task. Every later public operation fails fast with
    /// [`ChunkSocketError::Disposed`].
    pub async fn dispose(&self) {
        let prior = self.state.swap(ConnectionState::Disposed);
        if prior == ConnectionState::Disposed {
            debug!("dispose already performed, ignoring");
            return;
        }

        info!("disposing client");
        self.shutdown.cancel();
        self.socket.release();

        let handle = self.listener.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!("listen task join failed: {}", e);
                }
            }
        }
        debug!("client disposed");
    }

    /// Live transport state at query time (not cached)
    #[inline]
    pub fn is_connected(&self) -> bool {
        !self.state.is_disposed() && self.socket.is_open()
    }

    /// Whether a listening loop is currently running
    #[inline]
    pub fn is_listening(&self) -> bool {
        self.listener_active.load(Ordering::Acquire)
    }

    /// Current lifecycle state
    #[inline]
    pub fn connection_state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Get current metrics
    pub fn metrics(&self) -> Metrics {
        Metrics {
            messages_sent: self.metrics.messages_sent(),
            messages_received: self.metrics.messages_received(),
            chunks_sent: self.metrics.chunks_sent(),
            chunks_received: self.metrics.chunks_received(),
            connection_state: self.state.get(),
        }
    }

    /// Try to receive an event (non-blocking)
    pub fn try_recv_event(&self) -> Option<ClientEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Receive an event (blocking)
    pub fn recv_event(&self) -> std::result::Result<ClientEvent, crossbeam_channel::RecvError> {
        self.event_rx.recv()
    }

    fn ensure_not_disposed(&self) -> Result<()> {
        if self.state.is_disposed() {
            return Err(ChunkSocketError::Disposed);
        }
        Ok(())
    }
}

impl<S> Drop for ChunkSocketClient<S>
where
    S: DuplexSocket + 'static,
{
    fn drop(&mut self) {
        if self.state.swap(ConnectionState::Disposed) == ConnectionState::Disposed {
            return;
        }
        self.shutdown.cancel();
        self.socket.release();
        if let Some(handle) = self.listener.lock().take() {
            handle.abort();
        }
    }
}
