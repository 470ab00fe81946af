//! WebSocket-backed channel over tokio-tungstenite.
//!
//! One connection to the realtime gateway, with an envelope protocol of
//! [`ClientFrame`]s out and [`ServerFrame`]s in. A writer task drains an
//! unbounded outbound queue; a reader task routes inbound events to
//! per-topic broadcast senders. When either side of the socket fails the
//! channel flips to disconnected and stays there — reconnecting means
//! building a new channel and re-subscribing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use hivesync_core::error::AppError;
use hivesync_core::result::AppResult;

use crate::message::{ClientFrame, ServerFrame, WireMessage};

use super::RealtimeChannel;

/// Channel connected to a realtime gateway over WebSocket.
#[derive(Debug)]
pub struct WsChannel {
    /// Topic name → broadcast sender for routed inbound events.
    topics: Arc<DashMap<String, broadcast::Sender<WireMessage>>>,
    /// Outbound frame queue consumed by the writer task.
    outbound: mpsc::UnboundedSender<ClientFrame>,
    /// Connection liveness.
    connected: Arc<AtomicBool>,
    /// Per-topic buffer size.
    buffer_size: usize,
    /// Reader and writer tasks.
    tasks: Vec<JoinHandle<()>>,
}

impl WsChannel {
    /// Connect to the gateway and start the reader/writer tasks.
    pub async fn connect(url: &str, buffer_size: usize) -> AppResult<Self> {
        let (stream, _) = connect_async(url).await.map_err(|e| {
            AppError::with_source(
                hivesync_core::error::ErrorKind::ServiceUnavailable,
                format!("WebSocket connect to '{url}' failed: {e}"),
                e,
            )
        })?;
        let (mut sink, mut source) = stream.split();

        let topics: Arc<DashMap<String, broadcast::Sender<WireMessage>>> =
            Arc::new(DashMap::new());
        let connected = Arc::new(AtomicBool::new(true));
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<ClientFrame>();

        let writer_connected = Arc::clone(&connected);
        let writer = tokio::spawn(async move {
            while let Some(frame) = outbound_rx.recv().await {
                let text = match serde_json::to_string(&frame) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Failed to encode outbound frame: {e}");
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(text.into())).await {
                    warn!("WebSocket send failed, marking channel disconnected: {e}");
                    writer_connected.store(false, Ordering::SeqCst);
                    break;
                }
            }
            debug!("WebSocket writer task ended");
        });

        let reader_topics = Arc::clone(&topics);
        let reader_connected = Arc::clone(&connected);
        let reader = tokio::spawn(async move {
            while let Some(msg) = source.next().await {
                match msg {
                    Ok(Message::Text(text)) => match serde_json::from_str(text.as_str()) {
                        Ok(ServerFrame::Event { topic, message }) => {
                            if let Some(sender) = reader_topics.get(&topic) {
                                // Send error only means no live receiver.
                                let _ = sender.send(message);
                            }
                        }
                        Err(e) => debug!("Ignoring unparseable inbound frame: {e}"),
                    },
                    Ok(Message::Close(_)) => {
                        debug!("WebSocket closed by gateway");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("WebSocket read failed: {e}");
                        break;
                    }
                }
            }
            reader_connected.store(false, Ordering::SeqCst);
            debug!("WebSocket reader task ended");
        });

        Ok(Self {
            topics,
            outbound,
            connected,
            buffer_size,
            tasks: vec![writer, reader],
        })
    }

    /// Tear down the connection tasks. The channel reports disconnected
    /// afterwards; safe to call more than once.
    pub fn close(&self) {
        self.connected.store(false, Ordering::SeqCst);
        for task in &self.tasks {
            task.abort();
        }
    }

    fn send_frame(&self, frame: ClientFrame) -> AppResult<()> {
        self.outbound
            .send(frame)
            .map_err(|_| AppError::service_unavailable("Channel writer is gone"))
    }
}

impl Drop for WsChannel {
    fn drop(&mut self) {
        self.close();
    }
}

#[async_trait]
impl RealtimeChannel for WsChannel {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn publish(&self, topic: &str, message: WireMessage) -> AppResult<()> {
        if !self.is_connected() {
            return Err(AppError::service_unavailable("Channel not connected"));
        }
        self.send_frame(ClientFrame::Publish {
            topic: topic.to_string(),
            message,
        })
    }

    fn subscribe(&self, topic: &str) -> AppResult<broadcast::Receiver<WireMessage>> {
        if !self.is_connected() {
            return Err(AppError::service_unavailable("Channel not connected"));
        }
        let receiver = self
            .topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.buffer_size).0)
            .subscribe();
        self.send_frame(ClientFrame::Subscribe {
            topic: topic.to_string(),
        })?;
        Ok(receiver)
    }

    fn unsubscribe(&self, topic: &str) {
        let removed = self
            .topics
            .remove_if(topic, |_, sender| sender.receiver_count() == 0);
        if removed.is_some() && self.is_connected() {
            let _ = self.send_frame(ClientFrame::Unsubscribe {
                topic: topic.to_string(),
            });
        }
    }
}
