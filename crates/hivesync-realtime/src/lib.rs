//! # hivesync-realtime
//!
//! Realtime layer of the presence engine: the pub/sub channel abstraction
//! with in-process and WebSocket implementations, the heartbeat scheduler,
//! the auto-away inactivity detector, the subscription manager with local
//! fan-out, and the named timer registry the schedulers are built on.

pub mod autoaway;
pub mod channel;
pub mod heartbeat;
pub mod local;
pub mod message;
pub mod subscription;
pub mod timer;
pub mod topic;

pub use autoaway::{ActivityEvent, AutoAwayDetector, StatusSink};
pub use channel::{InProcessChannel, RealtimeChannel};
pub use heartbeat::HeartbeatScheduler;
pub use local::LocalPresence;
pub use message::WireMessage;
pub use subscription::{Subscription, SubscriptionManager, UpdateHandler};
pub use timer::TimerRegistry;
