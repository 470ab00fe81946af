//! Pub/sub channel abstraction.
//!
//! The engine never talks to a socket directly; it is injected with a
//! [`RealtimeChannel`]. Reconnection is the channel implementation's
//! responsibility — subscribers re-subscribe after a reconnect.

pub mod memory;
pub mod ws;

use async_trait::async_trait;
use tokio::sync::broadcast;

use hivesync_core::result::AppResult;

use crate::message::WireMessage;

pub use memory::InProcessChannel;
pub use ws::WsChannel;

/// A pub/sub channel delivering [`WireMessage`]s by topic.
#[async_trait]
pub trait RealtimeChannel: Send + Sync + std::fmt::Debug + 'static {
    /// Whether the channel is currently connected.
    fn is_connected(&self) -> bool;

    /// Publish a message to a topic.
    ///
    /// Returns a `ServiceUnavailable` error when disconnected; callers for
    /// whom delivery is best-effort log and move on instead of propagating.
    async fn publish(&self, topic: &str, message: WireMessage) -> AppResult<()>;

    /// Open a receiver for a topic.
    ///
    /// Fails with `ServiceUnavailable` when the channel is disconnected;
    /// there is no queueing of subscription intents.
    fn subscribe(&self, topic: &str) -> AppResult<broadcast::Receiver<WireMessage>>;

    /// Signal that no local receiver remains for a topic.
    fn unsubscribe(&self, topic: &str);
}
