//! Heartbeat scheduler — periodic liveness announcements.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time;
use tracing::debug;

use crate::channel::RealtimeChannel;
use crate::local::LocalPresence;
use crate::message::WireMessage;
use crate::timer::TimerRegistry;
use crate::topic;

/// Registry name of the periodic heartbeat task.
const HEARTBEAT_TIMER: &str = "heartbeat";

/// Announces this client's liveness on a fixed interval.
///
/// Heartbeats are best-effort: when the channel is disconnected they are
/// skipped with a debug log and must never crash the host. The scheduler
/// only re-announces whatever status the mutation coordinator last set in
/// [`LocalPresence`].
#[derive(Debug)]
pub struct HeartbeatScheduler {
    channel: Arc<dyn RealtimeChannel>,
    local: Arc<LocalPresence>,
    timers: Arc<TimerRegistry>,
    interval: Duration,
    running: AtomicBool,
}

impl HeartbeatScheduler {
    /// Create a stopped scheduler.
    pub fn new(
        channel: Arc<dyn RealtimeChannel>,
        local: Arc<LocalPresence>,
        timers: Arc<TimerRegistry>,
        interval: Duration,
    ) -> Self {
        Self {
            channel,
            local,
            timers,
            interval,
            running: AtomicBool::new(false),
        }
    }

    /// Start announcing: one heartbeat immediately, then one per interval.
    ///
    /// Restart-idempotent — a running timer is replaced, never duplicated.
    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
        let channel = Arc::clone(&self.channel);
        let local = Arc::clone(&self.local);
        let interval = self.interval;
        self.timers.start(HEARTBEAT_TIMER, async move {
            let mut ticker = time::interval(interval);
            loop {
                // First tick completes immediately.
                ticker.tick().await;
                Self::emit(&channel, &local).await;
            }
        });
    }

    /// Stop announcing. The pending timer is cleared synchronously.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.timers.cancel(HEARTBEAT_TIMER);
    }

    /// Whether the scheduler is currently started.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Emit one heartbeat outside the regular cadence.
    ///
    /// A no-op after `stop()` and while the channel is disconnected.
    pub async fn send_now(&self) {
        if !self.is_running() {
            debug!("Heartbeat scheduler stopped; ignoring send_now");
            return;
        }
        Self::emit(&self.channel, &self.local).await;
    }

    async fn emit(channel: &Arc<dyn RealtimeChannel>, local: &Arc<LocalPresence>) {
        if !channel.is_connected() {
            debug!("Channel not connected; skipping heartbeat");
            return;
        }
        let heartbeat = local.heartbeat().await;
        if let Err(e) = channel
            .publish(topic::HEARTBEAT, WireMessage::Heartbeat(heartbeat))
            .await
        {
            debug!("Heartbeat publish failed: {e}");
        }
    }
}
