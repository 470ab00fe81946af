//! Presence status definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A user's availability status as known to the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    /// User is connected and available.
    Online,
    /// User is connected but inactive.
    Away,
    /// User has marked themselves as busy.
    Busy,
    /// User is in a focus period.
    Focusing,
    /// User is not connected.
    Offline,
}

impl PresenceStatus {
    /// Converts to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Away => "away",
            Self::Busy => "busy",
            Self::Focusing => "focusing",
            Self::Offline => "offline",
        }
    }

    /// Whether the auto-away detector may replace this status.
    ///
    /// Only `online` is eligible: `busy`, `focusing`, and explicit states
    /// must never be overridden by the inactivity timer.
    pub fn auto_away_eligible(&self) -> bool {
        matches!(self, Self::Online)
    }
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
