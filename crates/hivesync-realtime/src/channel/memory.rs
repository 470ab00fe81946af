//! In-process channel over tokio broadcast.
//!
//! Used by tests and by single-process hosts where publisher and
//! subscribers share one address space. Connectivity can be toggled to
//! exercise the disconnected degradation paths.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;

use hivesync_core::error::AppError;
use hivesync_core::result::AppResult;

use crate::message::WireMessage;

use super::RealtimeChannel;

/// Channel routing messages between topics of a single process.
#[derive(Debug)]
pub struct InProcessChannel {
    /// Topic name → broadcast sender.
    topics: DashMap<String, broadcast::Sender<WireMessage>>,
    /// Per-topic buffer size.
    buffer_size: usize,
    /// Simulated connectivity.
    connected: AtomicBool,
}

impl InProcessChannel {
    /// Create a connected channel.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            topics: DashMap::new(),
            buffer_size,
            connected: AtomicBool::new(true),
        }
    }

    /// Toggle simulated connectivity.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    fn sender(&self, topic: &str) -> broadcast::Sender<WireMessage> {
        self.topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.buffer_size).0)
            .clone()
    }
}

#[async_trait]
impl RealtimeChannel for InProcessChannel {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn publish(&self, topic: &str, message: WireMessage) -> AppResult<()> {
        if !self.is_connected() {
            return Err(AppError::service_unavailable("Channel not connected"));
        }
        // A send error only means nobody is listening on this topic.
        let _ = self.sender(topic).send(message);
        Ok(())
    }

    fn subscribe(&self, topic: &str) -> AppResult<broadcast::Receiver<WireMessage>> {
        if !self.is_connected() {
            return Err(AppError::service_unavailable("Channel not connected"));
        }
        Ok(self.sender(topic).subscribe())
    }

    fn unsubscribe(&self, topic: &str) {
        self.topics
            .remove_if(topic, |_, sender| sender.receiver_count() == 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hivesync_core::error::ErrorKind;
    use hivesync_core::types::UserId;
    use hivesync_entity::presence::{PresenceStatus, PresenceUpdate};

    fn update() -> WireMessage {
        WireMessage::PresenceUpdate(PresenceUpdate {
            user_id: UserId::new(),
            status: PresenceStatus::Online,
            activity: None,
            timestamp: Utc::now(),
        })
    }

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let channel = InProcessChannel::new(16);
        let mut rx = channel.subscribe("presence/heartbeat").expect("subscribe");
        channel
            .publish("presence/heartbeat", update())
            .await
            .expect("publish");
        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_disconnected_channel_refuses() {
        let channel = InProcessChannel::new(16);
        channel.set_connected(false);

        let err = channel.subscribe("t").expect_err("must refuse");
        assert_eq!(err.kind, ErrorKind::ServiceUnavailable);

        let err = channel.publish("t", update()).await.expect_err("must refuse");
        assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let channel = InProcessChannel::new(16);
        channel.publish("nobody", update()).await.expect("publish");
    }

    #[tokio::test]
    async fn test_unsubscribe_drops_idle_topic() {
        let channel = InProcessChannel::new(16);
        let rx = channel.subscribe("t").expect("subscribe");
        channel.unsubscribe("t");
        assert!(channel.topics.contains_key("t"), "receiver still open");
        drop(rx);
        channel.unsubscribe("t");
        assert!(!channel.topics.contains_key("t"));
    }
}
