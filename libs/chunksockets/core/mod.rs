//! Core client: lifecycle orchestration, chunked transmission, reassembly

pub mod client;
pub mod config;
pub mod connection_state;
pub mod receiver;
pub mod sender;

// Re-export main types
pub use client::{ChunkSocketClient, ClientEvent, Metrics};
pub use config::{ClientConfig, DEFAULT_CHUNK_SIZE};
pub use connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};

// Re-export traits for convenience
pub use crate::traits::*;
