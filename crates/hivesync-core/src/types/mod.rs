//! Shared core types.

pub mod id;

pub use id::{CollabSessionId, HiveId, UserId};
