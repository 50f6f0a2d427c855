//! Lock-free connection state and counters
//!
//! The connection state is a tagged enum stored in a single atomic, so every
//! public operation can check it without taking a lock and `dispose` can claim
//! the release with one atomic swap.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    /// No live connection
    Disconnected = 0,
    /// Connection attempt in progress
    Connecting = 1,
    /// Connected and usable
    Connected = 2,
    /// Close handshake in progress
    Closing = 3,
    /// Client disposed; terminal state
    Disposed = 4,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ConnectionState::Disconnected,
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            3 => ConnectionState::Closing,
            _ => ConnectionState::Disposed,
        }
    }
}

/// Atomic wrapper around [`ConnectionState`]
///
/// `Disposed` is terminal: `set_if_live` refuses to leave it, and `swap`
/// reports the prior state so exactly one caller can claim the release.
#[derive(Debug)]
pub struct AtomicConnectionState {
    inner: AtomicU8,
}

impl AtomicConnectionState {
    pub fn new(initial: ConnectionState) -> Self {
        Self {
            inner: AtomicU8::new(initial as u8),
        }
    }

    /// Current state
    #[inline]
    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.inner.load(Ordering::Acquire))
    }

    /// Unconditionally set the state
    #[inline]
    pub fn set(&self, next: ConnectionState) {
        self.inner.store(next as u8, Ordering::Release);
    }

    /// Set the state unless the client has been disposed
    ///
    /// Returns `false` if the state was `Disposed`, which must never be
    /// overwritten by a racing in-flight operation.
    pub fn set_if_live(&self, next: ConnectionState) -> bool {
        let mut current = self.inner.load(Ordering::Acquire);
        loop {
            if ConnectionState::from_u8(current) == ConnectionState::Disposed {
                return false;
            }
            match self.inner.compare_exchange(
                current,
                next as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
    }

    /// Swap in a new state, returning the prior one
    #[inline]
    pub fn swap(&self, next: ConnectionState) -> ConnectionState {
        ConnectionState::from_u8(self.inner.swap(next as u8, Ordering::AcqRel))
    }

    /// Atomically transition from `current` to `next`
    pub fn compare_exchange(
        &self,
        current: ConnectionState,
        next: ConnectionState,
    ) -> std::result::Result<ConnectionState, ConnectionState> {
        self.inner
            .compare_exchange(
                current as u8,
                next as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(ConnectionState::from_u8)
            .map_err(ConnectionState::from_u8)
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.get() == ConnectionState::Connected
    }

    #[inline]
    pub fn is_connecting(&self) -> bool {
        self.get() == ConnectionState::Connecting
    }

    #[inline]
    pub fn is_disconnected(&self) -> bool {
        self.get() == ConnectionState::Disconnected
    }

    #[inline]
    pub fn is_closing(&self) -> bool {
        self.get() == ConnectionState::Closing
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.get() == ConnectionState::Disposed
    }
}

/// Atomic message/chunk counters
#[derive(Debug, Default)]
pub struct AtomicMetrics {
    messages_sent: AtomicU64,
    messages_received: AtomicU64,
    chunks_sent: AtomicU64,
    chunks_received: AtomicU64,
}

impl AtomicMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn increment_messages_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_messages_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_chunks_sent(&self) {
        self.chunks_sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_chunks_received(&self) {
        self.chunks_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn messages_sent(&self) -> u64 {
        self.messages_sent.load(Ordering::Relaxed)
    }

    pub fn messages_received(&self) -> u64 {
        self.messages_received.load(Ordering::Relaxed)
    }

    pub fn chunks_sent(&self) -> u64 {
        self.chunks_sent.load(Ordering::Relaxed)
    }

    pub fn chunks_received(&self) -> u64 {
        self.chunks_received.load(Ordering::Relaxed)
    }
}
