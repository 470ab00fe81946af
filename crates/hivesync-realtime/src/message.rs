//! Wire message definitions for the realtime channel.

use serde::{Deserialize, Serialize};

use hivesync_entity::presence::{PresenceHeartbeat, PresenceUpdate};

/// Payloads carried on presence topics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireMessage {
    /// A presence change for one user.
    PresenceUpdate(PresenceUpdate),
    /// A liveness announcement from one client.
    Heartbeat(PresenceHeartbeat),
}

/// Frames sent by this client to the realtime gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Subscribe to a topic.
    Subscribe {
        /// Topic name.
        topic: String,
    },
    /// Unsubscribe from a topic.
    Unsubscribe {
        /// Topic name.
        topic: String,
    },
    /// Publish a message to a topic.
    Publish {
        /// Topic name.
        topic: String,
        /// The payload.
        message: WireMessage,
    },
}

/// Frames sent by the realtime gateway to this client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// A message delivered on a subscribed topic.
    Event {
        /// Topic the message arrived on.
        topic: String,
        /// The payload.
        message: WireMessage,
    },
}
