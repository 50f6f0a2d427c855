use crate::error::Result;
use async_trait::async_trait;

/// Close-handshake status codes
///
/// Mirrors the status vocabulary of the underlying duplex socket primitive.
/// Codes outside the named set round-trip through `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseStatus {
    /// Normal closure (1000)
    Normal,
    /// Endpoint going away (1001)
    GoingAway,
    /// Protocol error (1002)
    ProtocolError,
    /// Unacceptable data type (1003)
    UnsupportedData,
    /// Invalid payload data (1007)
    InvalidPayload,
    /// Policy violation (1008)
    PolicyViolation,
    /// Message too big (1009)
    MessageTooBig,
    /// Unexpected server condition (1011)
    InternalError,
    /// Any other status code
    Other(u16),
}

impl CloseStatus {
    /// The numeric wire code for this status
    pub fn code(self) -> u16 {
        match self {
            CloseStatus::Normal => 1000,
            CloseStatus::GoingAway => 1001,
            CloseStatus::ProtocolError => 1002,
            CloseStatus::UnsupportedData => 1003,
            CloseStatus::InvalidPayload => 1007,
            CloseStatus::PolicyViolation => 1008,
            CloseStatus::MessageTooBig => 1009,
            CloseStatus::InternalError => 1011,
            CloseStatus::Other(code) => code,
        }
    }

    /// Build a status from its numeric wire code
    pub fn from_code(code: u16) -> Self {
        match code {
            1000 => CloseStatus::Normal,
            1001 => CloseStatus::GoingAway,
            1002 => CloseStatus::ProtocolError,
            1003 => CloseStatus::UnsupportedData,
            1007 => CloseStatus::InvalidPayload,
            1008 => CloseStatus::PolicyViolation,
            1009 => CloseStatus::MessageTooBig,
            1011 => CloseStatus::InternalError,
            other => CloseStatus::Other(other),
        }
    }
}

/// One chunk as delivered by the duplex socket primitive
///
/// Transient: produced and consumed within a single receive-loop iteration.
#[derive(Debug, Clone)]
pub enum RawChunk {
    /// A piece of a logical message; `is_final` marks the message boundary
    Data { bytes: Vec<u8>, is_final: bool },
    /// A close frame ending the connection
    Close { status: CloseStatus, reason: String },
}

impl RawChunk {
    /// Check if this chunk is a close frame
    pub fn is_close(&self) -> bool {
        matches!(self, RawChunk::Close { .. })
    }
}

/// The chunked duplex socket primitive the client builds upon
///
/// Implementations already perform the wire-level handshake and frame
/// encoding; this trait only exposes chunk-level transmission and receipt.
/// One send and one receive may be in flight concurrently on the same
/// socket (opposite directions of the duplex connection); implementations
/// must support that without external locking.
#[async_trait]
pub trait DuplexSocket: Send + Sync {
    /// Open the connection to the given URL
    async fn connect(&self, url: &str) -> Result<()>;

    /// Transmit one chunk; `is_final` marks the end of a logical message
    async fn send_chunk(&self, bytes: &[u8], is_final: bool) -> Result<()>;

    /// Receive one chunk
    ///
    /// `max_len` is a buffer-size hint; transports whose delivery granularity
    /// is fixed (one complete message per read) may ignore it.
    async fn receive_chunk(&self, max_len: usize) -> Result<RawChunk>;

    /// Send a close frame and await its transmission
    ///
    /// Closing an already-closed socket is a no-op.
    async fn close(&self, status: CloseStatus, reason: &str) -> Result<()>;

    /// Live transport state at query time
    fn is_open(&self) -> bool;

    /// Abruptly release the underlying resources
    ///
    /// In-flight operations are left to fail naturally. Callers guarantee
    /// this is invoked at most once per socket.
    fn release(&self);
}
