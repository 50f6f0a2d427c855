//! Common test utilities for ChunkSockets integration tests
//!
//! Provides a scripted in-memory duplex socket plus helpers for waiting on
//! client events without blocking the runtime.

#![allow(dead_code)]

use async_trait::async_trait;
use chunksockets::traits::{ChunkSocketError, CloseStatus, DuplexSocket, RawChunk, Result};
use chunksockets::{ChunkSocketClient, ClientEvent};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

struct MockInner {
    script_tx: mpsc::UnboundedSender<Result<RawChunk>>,
    script_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Result<RawChunk>>>,
    sent: parking_lot::Mutex<Vec<(Vec<u8>, bool)>>,
    open: AtomicBool,
    release_count: AtomicUsize,
    fail_sends: AtomicBool,
    fail_connect: AtomicBool,
}

/// Scripted mock duplex socket
///
/// Clones share one inner state, so a test can keep a handle while the
/// client owns another. Inbound chunks are scripted with `push_*`; outbound
/// chunks are recorded verbatim. When the script is exhausted, reads pend
/// like an idle socket would.
#[derive(Clone)]
pub struct MockSocket {
    inner: Arc<MockInner>,
}

impl MockSocket {
    pub fn new() -> Self {
        let (script_tx, script_rx) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(MockInner {
                script_tx,
                script_rx: tokio::sync::Mutex::new(script_rx),
                sent: parking_lot::Mutex::new(Vec::new()),
                open: AtomicBool::new(false),
                release_count: AtomicUsize::new(0),
                fail_sends: AtomicBool::new(false),
                fail_connect: AtomicBool::new(false),
            }),
        }
    }

    /// Script one inbound data chunk
    pub fn push_data(&self, bytes: &[u8], is_final: bool) {
        let _ = self.inner.script_tx.send(Ok(RawChunk::Data {
            bytes: bytes.to_vec(),
            is_final,
        }));
    }

    /// Script an inbound close frame
    pub fn push_close(&self, status: CloseStatus) {
        let _ = self.inner.script_tx.send(Ok(RawChunk::Close {
            status,
            reason: String::new(),
        }));
    }

    /// Script a read failure
    pub fn push_error(&self, message: &str) {
        let _ = self
            .inner
            .script_tx
            .send(Err(ChunkSocketError::Transport(message.to_string())));
    }

    /// Everything sent through the socket, in order
    pub fn sent_chunks(&self) -> Vec<(Vec<u8>, bool)> {
        self.inner.sent.lock().clone()
    }

    /// How many times `release` was invoked
    pub fn release_count(&self) -> usize {
        self.inner.release_count.load(Ordering::Acquire)
    }

    /// Make every subsequent send fail
    pub fn set_fail_sends(&self, fail: bool) {
        self.inner.fail_sends.store(fail, Ordering::Release);
    }

    /// Make the next connect attempt fail
    pub fn set_fail_connect(&self, fail: bool) {
        self.inner.fail_connect.store(fail, Ordering::Release);
    }
}

#[async_trait]
impl DuplexSocket for MockSocket {
    async fn connect(&self, _url: &str) -> Result<()> {
        if self.inner.fail_connect.load(Ordering::Acquire) {
            return Err(ChunkSocketError::ConnectFailed(
                "injected connect failure".to_string(),
            ));
        }
        self.inner.open.store(true, Ordering::Release);
        Ok(())
    }

    async fn send_chunk(&self, bytes: &[u8], is_final: bool) -> Result<()> {
        if !self.inner.open.load(Ordering::Acquire) {
            return Err(ChunkSocketError::ConnectionClosed(
                "socket not open".to_string(),
            ));
        }
        if self.inner.fail_sends.load(Ordering::Acquire) {
            return Err(ChunkSocketError::Transport(
                "injected send failure".to_string(),
            ));
        }
        self.inner.sent.lock().push((bytes.to_vec(), is_final));
        Ok(())
    }

    async fn receive_chunk(&self, _max_len: usize) -> Result<RawChunk> {
        let mut rx = self.inner.script_rx.lock().await;
        match rx.recv().await {
            Some(item) => item,
            None => Err(ChunkSocketError::ConnectionClosed(
                "script channel closed".to_string(),
            )),
        }
    }

    async fn close(&self, _status: CloseStatus, _reason: &str) -> Result<()> {
        self.inner.open.store(false, Ordering::Release);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.inner.open.load(Ordering::Acquire)
    }

    fn release(&self) {
        self.inner.open.store(false, Ordering::Release);
        self.inner.release_count.fetch_add(1, Ordering::AcqRel);
    }
}

/// Poll for the next client event without blocking the runtime
pub async fn next_event(
    client: &ChunkSocketClient<MockSocket>,
    timeout: Duration,
) -> Option<ClientEvent> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Some(event) = client.try_recv_event() {
            return Some(event);
        }
        if tokio::time::Instant::now() >= deadline {
            return None;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Poll until the predicate holds or the timeout elapses
pub async fn wait_until<F>(predicate: F, timeout: Duration) -> bool
where
    F: Fn() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if predicate() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// A client connected to a fresh mock socket, Connected event drained
pub async fn connected_client() -> (ChunkSocketClient<MockSocket>, MockSocket) {
    let mock = MockSocket::new();
    let client = ChunkSocketClient::new(mock.clone());
    client
        .connect("ws://mock.test", &CancellationToken::new())
        .await
        .expect("mock connect should succeed");
    match client.try_recv_event() {
        Some(ClientEvent::Connected) => {}
        other => panic!("expected Connected event, got {:?}", other),
    }
    (client, mock)
}
