//! # hivesync-cache
//!
//! Time-bounded in-memory store of last-known presence per user and hive.
//!
//! The store is the single source of truth for "last known" state. Entries
//! expire after a fixed TTL and are evicted lazily on read; updates merge
//! with timestamp-monotonic stale rejection so convergence per key holds
//! under concurrent writers.

pub mod entry;
pub mod store;

pub use entry::CacheEntry;
pub use store::PresenceStore;
