//! Production [`DuplexSocket`] over tokio-tungstenite
//!
//! Outbound chunks map to raw WebSocket frames with an explicit FIN bit: the
//! first chunk of a message opens a binary frame sequence, later chunks are
//! continuation frames. Inbound delivery granularity is transport-determined:
//! tungstenite reassembles fragments itself, so every received data chunk
//! arrives complete and final and the `max_len` hint is ignored.

use crate::traits::{ChunkSocketError, CloseStatus, DuplexSocket, RawChunk, Result};
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::protocol::frame::coding::{CloseCode, Data, OpCode};
use tokio_tungstenite::tungstenite::protocol::frame::Frame;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Duplex socket over a tokio-tungstenite WebSocket connection
///
/// The write and read halves live behind separate async mutexes so one send
/// and one receive can be in flight concurrently without contention.
pub struct TungsteniteSocket {
    sink: Mutex<Option<WsSink>>,
    stream: Mutex<Option<WsSource>>,
    open: AtomicBool,
    /// Whether the previous outbound chunk left a frame sequence unterminated
    mid_message: AtomicBool,
}

impl TungsteniteSocket {
    pub fn new() -> Self {
        Self {
            sink: Mutex::new(None),
            stream: Mutex::new(None),
            open: AtomicBool::new(false),
            mid_message: AtomicBool::new(false),
        }
    }
}

impl Default for TungsteniteSocket {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DuplexSocket for TungsteniteSocket {
    async fn connect(&self, url: &str) -> Result<()> {
        let (ws_stream, _) = connect_async(url)
            .await
            .map_err(|e| ChunkSocketError::ConnectFailed(e.to_string()))?;
        let (sink, stream) = ws_stream.split();

        *self.sink.lock().await = Some(sink);
        *self.stream.lock().await = Some(stream);
        self.mid_message.store(false, Ordering::Release);
        self.open.store(true, Ordering::Release);
        info!("websocket connected to {}", url);
        Ok(())
    }

    async fn send_chunk(&self, bytes: &[u8], is_final: bool) -> Result<()> {
        let mut guard = self.sink.lock().await;
        let sink = guard.as_mut().ok_or_else(|| {
            ChunkSocketError::ConnectionClosed("socket not connected".to_string())
        })?;

        let opcode = if self.mid_message.load(Ordering::Acquire) {
            OpCode::Data(Data::Continue)
        } else {
            OpCode::Data(Data::Binary)
        };
        let frame = Frame::message(bytes.to_vec(), opcode, is_final);

        sink.send(Message::Frame(frame))
            .await
            .map_err(|e| ChunkSocketError::Transport(e.to_string()))?;
        self.mid_message.store(!is_final, Ordering::Release);
        Ok(())
    }

    async fn receive_chunk(&self, _max_len: usize) -> Result<RawChunk> {
        let mut guard = self.stream.lock().await;
        let stream = guard.as_mut().ok_or_else(|| {
            ChunkSocketError::ConnectionClosed("socket not connected".to_string())
        })?;

        loop {
            match stream.next().await {
                Some(Ok(Message::Binary(bytes))) => {
                    return Ok(RawChunk::Data {
                        bytes,
                        is_final: true,
                    })
                }
                Some(Ok(Message::Text(text))) => {
                    return Ok(RawChunk::Data {
                        bytes: text.into_bytes(),
                        is_final: true,
                    })
                }
                Some(Ok(Message::Close(frame))) => {
                    self.open.store(false, Ordering::Release);
                    let (status, reason) = match frame {
                        Some(f) => (
                            CloseStatus::from_code(f.code.into()),
                            f.reason.into_owned(),
                        ),
                        None => (CloseStatus::Normal, String::new()),
                    };
                    return Ok(RawChunk::Close { status, reason });
                }
                // Control frames are handled by tungstenite itself
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                // Raw frames are never produced on the read side
                Some(Ok(Message::Frame(_))) => continue,
                Some(Err(e)) => {
                    self.open.store(false, Ordering::Release);
                    return Err(ChunkSocketError::Transport(e.to_string()));
                }
                None => {
                    self.open.store(false, Ordering::Release);
                    return Err(ChunkSocketError::ConnectionClosed(
                        "stream ended".to_string(),
                    ));
                }
            }
        }
    }

    async fn close(&self, status: CloseStatus, reason: &str) -> Result<()> {
        if !self.open.swap(false, Ordering::AcqRel) {
            debug!("close on already-closed socket, ignoring");
            return Ok(());
        }

        let mut guard = self.sink.lock().await;
        if let Some(sink) = guard.as_mut() {
            let frame = CloseFrame {
                code: CloseCode::from(status.code()),
                reason: Cow::Owned(reason.to_string()),
            };
            sink.send(Message::Close(Some(frame)))
                .await
                .map_err(|e| ChunkSocketError::Transport(e.to_string()))?;
            debug!("close frame sent ({:?})", status);
        }
        self.mid_message.store(false, Ordering::Release);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn release(&self) {
        self.open.store(false, Ordering::Release);
        match self.sink.try_lock() {
            Ok(mut guard) => {
                guard.take();
            }
            Err(_) => warn!("sink busy during release, left to fail naturally"),
        }
        match self.stream.try_lock() {
            Ok(mut guard) => {
                guard.take();
            }
            Err(_) => warn!("stream busy during release, left to fail naturally"),
        }
    }
}
