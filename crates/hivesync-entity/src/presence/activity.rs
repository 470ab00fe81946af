//! Structured activity descriptors attached to a presence state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hivesync_core::types::HiveId;

/// Category of a user's current activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// A timed focus period.
    Focus,
    /// A break between focus periods.
    Break,
    /// A meeting or call.
    Meeting,
    /// Free-form activity described only by its text.
    Custom,
}

/// Optional structured descriptor of what a user is currently doing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDescriptor {
    /// Activity category.
    pub kind: ActivityKind,
    /// Human-readable description.
    pub description: Option<String>,
    /// When the activity started.
    pub started_at: DateTime<Utc>,
    /// Hive the activity is associated with, if any.
    pub hive_id: Option<HiveId>,
}

impl ActivityDescriptor {
    /// Create a descriptor starting now.
    pub fn new(kind: ActivityKind, description: Option<String>, hive_id: Option<HiveId>) -> Self {
        Self {
            kind,
            description,
            started_at: Utc::now(),
            hive_id,
        }
    }
}
