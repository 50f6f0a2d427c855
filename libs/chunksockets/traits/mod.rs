//! # ChunkSockets Traits
//!
//! Core traits and types for the ChunkSockets transport adapter.
//!
//! This module provides the fundamental abstractions used throughout
//! the crate:
//!
//! - **DuplexSocket**: the chunked duplex socket primitive the client builds on
//! - **RawChunk**: one received chunk (data or close frame)
//! - **CloseStatus**: close-handshake status vocabulary
//!
//! ## Example
//!
//! ```rust,ignore
//! use chunksockets::traits::*;
//!
//! // Implement a custom transport
//! struct MyTransport;
//!
//! #[async_trait]
//! impl DuplexSocket for MyTransport {
//!     async fn send_chunk(&self, bytes: &[u8], is_final: bool) -> Result<()> {
//!         // Your transmission logic here
//!         Ok(())
//!     }
//!     // ...
//! }
//! ```

pub mod error;
pub mod transport;

// Re-export commonly used types
pub use error::{ChunkSocketError, Result};
pub use transport::{CloseStatus, DuplexSocket, RawChunk};
