use crate::traits::{ChunkSocketError, Result};

/// Default chunk size in bytes for both transmission and receipt
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Configuration for [`ChunkSocketClient`](crate::ChunkSocketClient)
///
/// The chunk size applies to `send` and `start_listening` unless overridden
/// per call via the `_with` variants.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Default chunk size in bytes; must be at least 1
    pub chunk_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default chunk size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size < 1 {
            return Err(ChunkSocketError::InvalidChunkSize(self.chunk_size));
        }
        Ok(())
    }
}
