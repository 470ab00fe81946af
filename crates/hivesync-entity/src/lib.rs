//! # hivesync-entity
//!
//! Domain model for HiveSync: presence state, liveness signals,
//! presence update events, and ephemeral collaboration sessions.

pub mod collaboration;
pub mod presence;
pub mod reporting;

pub use collaboration::{CollaborationSession, SessionPhase, SharedActivity, SharedActivitySpec};
pub use reporting::{PresenceHistoryEntry, PresenceStatistics};
pub use presence::{
    ActivityDescriptor, ActivityKind, DeviceKind, HivePresence, PresenceHeartbeat, PresenceStatus,
    PresenceUpdate, SetPresenceRequest, UserPresence,
};
