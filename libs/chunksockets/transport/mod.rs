//! Production transport implementations

pub mod tungstenite;

pub use tungstenite::TungsteniteSocket;
