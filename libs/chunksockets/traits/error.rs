use thiserror::Error;

/// Main error type for chunksockets
#[derive(Error, Debug)]
pub enum ChunkSocketError {
    /// Transport-level send/receive error
    #[error("transport error: {0}")]
    Transport(String),

    /// Connection closed unexpectedly
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Opening the connection failed
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    /// Chunk size must be at least 1 byte
    #[error("invalid chunk size: {0}")]
    InvalidChunkSize(usize),

    /// The awaited operation was cancelled by the caller's token
    #[error("operation cancelled")]
    Cancelled,

    /// The client has been disposed; no further operations are possible
    #[error("client already disposed")]
    Disposed,

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Channel send error
    #[error("channel send error: {0}")]
    ChannelSend(String),
}

/// Result type for chunksockets operations
pub type Result<T> = std::result::Result<T, ChunkSocketError>;
