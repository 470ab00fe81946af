//! Presence domain types.

pub mod activity;
pub mod heartbeat;
pub mod model;
pub mod status;
pub mod update;

pub use activity::{ActivityDescriptor, ActivityKind};
pub use heartbeat::PresenceHeartbeat;
pub use model::{DeviceKind, HivePresence, UserPresence};
pub use status::PresenceStatus;
pub use update::{PresenceUpdate, SetPresenceRequest};
