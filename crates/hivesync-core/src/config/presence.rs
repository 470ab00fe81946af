//! Presence engine configuration.

use serde::{Deserialize, Serialize};

/// Settings for the presence synchronization engine.
///
/// The cache TTL is deliberately shorter than other domain caches because
/// presence staleness is directly user-visible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// TTL for cached presence entries in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,
    /// Interval between outbound heartbeats in seconds.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_seconds: u64,
    /// A non-offline status implies `last_seen` within this window, in seconds.
    #[serde(default = "default_heartbeat_timeout")]
    pub heartbeat_timeout_seconds: u64,
    /// Idle threshold before the auto-away detector requests `away`, in ms.
    #[serde(default = "default_auto_away_threshold")]
    pub auto_away_threshold_ms: u64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: default_cache_ttl(),
            heartbeat_interval_seconds: default_heartbeat_interval(),
            heartbeat_timeout_seconds: default_heartbeat_timeout(),
            auto_away_threshold_ms: default_auto_away_threshold(),
        }
    }
}

fn default_cache_ttl() -> u64 {
    60
}

fn default_heartbeat_interval() -> u64 {
    30
}

fn default_heartbeat_timeout() -> u64 {
    60
}

fn default_auto_away_threshold() -> u64 {
    300_000
}
