//! Collaboration session domain types.

pub mod model;

pub use model::{CollaborationSession, SessionPhase, SharedActivity, SharedActivitySpec};
