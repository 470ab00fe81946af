//! Realtime channel configuration.

use serde::{Deserialize, Serialize};

/// Settings for the pub/sub channel used by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// WebSocket URL of the realtime gateway. When unset, the agent runs
    /// with an in-process channel (single-process hosts and tests).
    #[serde(default)]
    pub url: Option<String>,
    /// Internal buffer size for per-topic broadcast channels.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: None,
            channel_buffer_size: default_channel_buffer(),
        }
    }
}

fn default_channel_buffer() -> usize {
    256
}
