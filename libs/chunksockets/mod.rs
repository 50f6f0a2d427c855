//! # ChunkSockets
//!
//! A client-side, full-duplex, message-oriented transport adapter built atop a
//! chunked duplex socket primitive (a WebSocket-style transport).
//!
//! ## Features
//!
//! - **Chunked transmission**: one logical message is split into ordered,
//!   bounded-size chunks; only the last chunk carries the final-fragment flag
//! - **Reassembly**: a background listening task reconstructs complete logical
//!   messages from inbound chunks before anything crosses the public boundary
//! - **Typed event channel**: `Connected` / `Disconnected` / `MessageReceived` /
//!   `MessageSent` / `ListenerError` delivered over an unbounded crossbeam channel
//! - **Idempotent teardown**: atomic tagged connection state, single-release
//!   dispose, listening task joined on shutdown
//! - **Pluggable transport**: the `DuplexSocket` trait is the only seam; a
//!   tokio-tungstenite implementation ships in `transport`
//!
//! ## Example
//!
//! ```rust,ignore
//! use chunksockets::{ChunkSocketClient, ClientEvent, CloseStatus, TungsteniteSocket};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> chunksockets::Result<()> {
//!     let client = ChunkSocketClient::new(TungsteniteSocket::new());
//!     let ct = CancellationToken::new();
//!
//!     client.connect("wss://api.example.com", &ct).await?;
//!     client.start_listening(ct.child_token())?;
//!     client.send(b"hello", &ct).await?;
//!
//!     while let Ok(event) = client.recv_event() {
//!         match event {
//!             ClientEvent::MessageReceived(bytes) => println!("got {} bytes", bytes.len()),
//!             ClientEvent::Disconnected(status) => break,
//!             _ => {}
//!         }
//!     }
//!
//!     client.close(CloseStatus::Normal, "done", &ct).await?;
//!     client.dispose().await;
//!     Ok(())
//! }
//! ```

pub mod traits;
pub mod core;
pub mod transport;

// Re-export all traits
pub use traits::*;

// Re-export core client functionality
pub use core::{
    client, config, connection_state, receiver, sender,
    client::{ChunkSocketClient, ClientEvent, Metrics},
    config::{ClientConfig, DEFAULT_CHUNK_SIZE},
    connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState},
};

// Re-export the production transport
pub use transport::TungsteniteSocket;

/// Type alias for Result with ChunkSocketError
pub type Result<T> = std::result::Result<T, traits::ChunkSocketError>;
