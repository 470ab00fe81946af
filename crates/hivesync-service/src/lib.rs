//! # hivesync-service
//!
//! Service layer of the presence engine: the optimistic write helper, the
//! presence mutation coordinator, the collaboration session manager, and
//! the [`PresenceEngine`] facade that wires the whole engine together.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references.

pub mod collaboration;
pub mod engine;
pub mod optimistic;
pub mod presence;

pub use collaboration::CollaborationService;
pub use engine::PresenceEngine;
pub use optimistic::OptimisticWrite;
pub use presence::PresenceService;
