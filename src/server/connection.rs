//! Per-connection task pair
//!
//! Each accepted socket gets two tasks: an inbound loop reading the
//! WebSocket and dispatching to the session manager, and a drain task
//! pulling the connection's outbound queue and writing to the sink. The
//! inbound loop owns teardown: when it ends (close frame, transport error,
//! or heartbeat timeout) it runs the disconnect path, which closes the
//! queue and thereby stops the drain task.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{Sink, SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::Message;

use crate::error::Result;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::registry::{ConnectionEntry, RegistryError};
use crate::relay::Frame;
use crate::server::config::ServerConfig;
use crate::session::SessionManager;

pub(crate) struct Connection {
    socket: TcpStream,
    peer_addr: SocketAddr,
    config: ServerConfig,
    manager: Arc<SessionManager>,
}

impl Connection {
    pub(crate) fn new(
        socket: TcpStream,
        peer_addr: SocketAddr,
        config: ServerConfig,
        manager: Arc<SessionManager>,
    ) -> Self {
        Self {
            socket,
            peer_addr,
            config,
            manager,
        }
    }

    /// Drive the connection to completion
    pub(crate) async fn run(self) -> Result<()> {
        let Connection {
            socket,
            peer_addr,
            config,
            manager,
        } = self;

        let ws_config = WebSocketConfig {
            max_message_size: Some(config.max_payload_size),
            max_frame_size: Some(config.max_payload_size),
            ..Default::default()
        };
        let ws = tokio_tungstenite::accept_async_with_config(socket, Some(ws_config)).await?;

        let entry = manager.on_connect().await;
        let id = entry.id();
        tracing::debug!(conn = %id, peer = %peer_addr, "WebSocket established");

        let (sink, mut stream) = ws.split();

        let drain = tokio::spawn(drain_outbound(
            sink,
            Arc::clone(&entry),
            config.heartbeat_interval,
        ));

        // Inbound loop. Every read is bounded by the heartbeat timeout;
        // pongs and all other traffic count as liveness.
        loop {
            let msg = match tokio::time::timeout(config.heartbeat_timeout, stream.next()).await {
                Err(_) => {
                    tracing::debug!(conn = %id, "Heartbeat timeout");
                    break;
                }
                Ok(None) => break,
                Ok(Some(Err(e))) => {
                    tracing::debug!(conn = %id, error = %e, "Transport error");
                    break;
                }
                Ok(Some(Ok(msg))) => msg,
            };

            match msg {
                Message::Text(text) => dispatch(&manager, &entry, &text).await,
                Message::Binary(_) => {
                    tracing::debug!(conn = %id, "Binary message ignored");
                }
                Message::Close(_) => break,
                // Pings are answered by tungstenite; pongs only refresh the
                // read timeout above.
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }

        // Standard teardown: leave room, unregister, close queue. Closing
        // the queue ends the drain task's dequeue with QueueClosed.
        manager.on_disconnect(id).await;
        let _ = drain.await;

        Ok(())
    }
}

/// Decode one inbound text message and route it to the session manager
async fn dispatch(manager: &SessionManager, entry: &Arc<ConnectionEntry>, text: &str) {
    let id = entry.id();
    entry.counters.record_inbound(text.len());

    let msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            // Malformed input drops like NotInRoom does; the connection
            // stays up.
            tracing::debug!(conn = %id, error = %e, "Unparseable message dropped");
            return;
        }
    };

    match msg {
        ClientMessage::JoinRoom { room } => {
            if let Err(e @ RegistryError::InvalidRoomName(_)) =
                manager.on_join_room(id, &room).await
            {
                tracing::debug!(conn = %id, error = %e, "Join rejected");
                // Reported to the originator only, via its own queue so
                // ordering with other outbound traffic is kept.
                let report = Frame::error(id, &e.to_string());
                if entry.queue().enqueue(report).await.is_err() {
                    tracing::debug!(conn = %id, "Error report dropped, queue closed");
                }
            }
        }
        ClientMessage::SendVideo { image } => {
            manager
                .on_media(id, Frame::video(id, image.into_bytes()))
                .await;
        }
        ClientMessage::SendAudio { audio } => {
            manager
                .on_media(id, Frame::audio(id, audio.into_bytes()))
                .await;
        }
    }
}

/// Drain the outbound queue into the WebSocket sink
///
/// Interleaves heartbeat pings with frame transmission. Ends when the queue
/// closes (disconnect teardown) or the sink fails.
async fn drain_outbound<S>(mut sink: S, entry: Arc<ConnectionEntry>, ping_interval: Duration)
where
    S: Sink<Message> + Unpin,
{
    let id = entry.id();
    let mut ticker = tokio::time::interval(ping_interval);
    // The first tick fires immediately; skip it so pings start one interval in
    ticker.tick().await;

    loop {
        tokio::select! {
            result = entry.queue().dequeue() => match result {
                Ok(frame) => {
                    let msg = ServerMessage::from(&frame);
                    let text = match serde_json::to_string(&msg) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::debug!(conn = %id, error = %e, "Frame encode failed");
                            continue;
                        }
                    };

                    entry.counters.record_outbound(text.len());
                    if sink.send(Message::Text(text)).await.is_err() {
                        tracing::debug!(conn = %id, "Send failed, stopping drain");
                        break;
                    }
                }
                // QueueClosed: clean teardown, say goodbye if the peer is
                // still there
                Err(_) => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            },
            _ = ticker.tick() => {
                if sink.send(Message::Ping(Vec::new())).await.is_err() {
                    tracing::debug!(conn = %id, "Ping failed, stopping drain");
                    break;
                }
            }
        }
    }
}
