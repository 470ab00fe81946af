//! Auto-away detection from local activity signals.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time;
use tracing::debug;

use hivesync_entity::presence::PresenceStatus;

use crate::local::LocalPresence;
use crate::timer::TimerRegistry;

/// Registry name of the pending idle timer.
const IDLE_TIMER: &str = "auto_away";

/// A local activity signal that keeps the user present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityEvent {
    Pointer,
    Key,
    Touch,
    Visibility,
}

/// Receiver of the status transitions the detector requests.
///
/// Implemented by the presence service. The detector fires from timers and
/// has no caller to surface errors to, so implementers log failures rather
/// than returning them.
#[async_trait]
pub trait StatusSink: Send + Sync + std::fmt::Debug + 'static {
    async fn request_status(&self, status: PresenceStatus);
}

/// Converts sustained inactivity into an `away` transition, and renewed
/// activity back into `online`.
///
/// Only an `online` user is ever moved to `away`; explicit states like
/// `busy` and `focusing` are never overridden. All transitions go through
/// the [`StatusSink`], never to the network directly.
#[derive(Debug)]
pub struct AutoAwayDetector {
    sink: Arc<dyn StatusSink>,
    local: Arc<LocalPresence>,
    timers: Arc<TimerRegistry>,
    threshold_ms: AtomicU64,
    enabled: Arc<AtomicBool>,
}

impl AutoAwayDetector {
    /// Create a disabled detector with a default idle threshold.
    pub fn new(
        sink: Arc<dyn StatusSink>,
        local: Arc<LocalPresence>,
        timers: Arc<TimerRegistry>,
        default_threshold: Duration,
    ) -> Self {
        Self {
            sink,
            local,
            timers,
            threshold_ms: AtomicU64::new(default_threshold.as_millis() as u64),
            enabled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Enable detection with the given idle threshold and arm the timer.
    pub fn enable(&self, threshold: Duration) {
        self.threshold_ms
            .store(threshold.as_millis() as u64, Ordering::SeqCst);
        self.enabled.store(true, Ordering::SeqCst);
        self.arm();
    }

    /// Disable detection. The pending idle timer is cleared synchronously.
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        self.timers.cancel(IDLE_TIMER);
    }

    /// Whether detection is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// The idle threshold currently in effect.
    pub fn threshold(&self) -> Duration {
        Duration::from_millis(self.threshold_ms.load(Ordering::SeqCst))
    }

    /// Note a local activity signal.
    ///
    /// Re-arms the idle timer, and when the user had been moved to `away`,
    /// requests `online` through the sink.
    pub async fn record_activity(&self, event: ActivityEvent) {
        if !self.is_enabled() {
            return;
        }
        debug!("Activity observed: {event:?}");
        self.arm();
        if self.local.status().await == PresenceStatus::Away {
            self.sink.request_status(PresenceStatus::Online).await;
        }
    }

    fn arm(&self) {
        let sink = Arc::clone(&self.sink);
        let local = Arc::clone(&self.local);
        let enabled = Arc::clone(&self.enabled);
        let threshold = self.threshold();
        self.timers.start(IDLE_TIMER, async move {
            time::sleep(threshold).await;
            if !enabled.load(Ordering::SeqCst) {
                return;
            }
            let status = local.status().await;
            if !status.auto_away_eligible() {
                debug!("Idle threshold reached but status is {status}; leaving as is");
                return;
            }
            debug!("Idle threshold reached; requesting away");
            sink.request_status(PresenceStatus::Away).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hivesync_core::types::UserId;
    use hivesync_entity::presence::DeviceKind;
    use tokio::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingSink {
        requests: Mutex<Vec<PresenceStatus>>,
    }

    #[async_trait]
    impl StatusSink for RecordingSink {
        async fn request_status(&self, status: PresenceStatus) {
            self.requests.lock().await.push(status);
        }
    }

    fn detector() -> (Arc<AutoAwayDetector>, Arc<RecordingSink>, Arc<LocalPresence>) {
        let sink = Arc::new(RecordingSink::default());
        let local = Arc::new(LocalPresence::new(UserId::new(), DeviceKind::Desktop));
        let detector = Arc::new(AutoAwayDetector::new(
            sink.clone(),
            local.clone(),
            Arc::new(TimerRegistry::new()),
            Duration::from_secs(300),
        ));
        (detector, sink, local)
    }

    #[tokio::test]
    async fn test_idle_online_user_goes_away() {
        let (detector, sink, _) = detector();
        detector.enable(Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(*sink.requests.lock().await, vec![PresenceStatus::Away]);
    }

    #[tokio::test]
    async fn test_explicit_status_is_never_overridden() {
        let (detector, sink, local) = detector();
        local.set_status(PresenceStatus::Focusing).await;
        detector.enable(Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(sink.requests.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_activity_rearms_idle_timer() {
        let (detector, sink, _) = detector();
        detector.enable(Duration::from_millis(50));
        tokio::time::sleep(Duration::from_millis(30)).await;
        detector.record_activity(ActivityEvent::Key).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        // 60ms elapsed but never 50ms without activity.
        assert!(sink.requests.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_activity_while_away_requests_online() {
        let (detector, sink, local) = detector();
        local.set_status(PresenceStatus::Away).await;
        detector.enable(Duration::from_secs(60));
        detector.record_activity(ActivityEvent::Pointer).await;
        assert_eq!(*sink.requests.lock().await, vec![PresenceStatus::Online]);
    }

    #[tokio::test]
    async fn test_disable_clears_pending_timer() {
        let (detector, sink, _) = detector();
        detector.enable(Duration::from_millis(20));
        detector.disable();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(sink.requests.lock().await.is_empty());
        // Disabling twice is harmless.
        detector.disable();
    }

    #[tokio::test]
    async fn test_disabled_detector_ignores_activity() {
        let (detector, sink, local) = detector();
        local.set_status(PresenceStatus::Away).await;
        detector.record_activity(ActivityEvent::Touch).await;
        assert!(sink.requests.lock().await.is_empty());
    }
}
