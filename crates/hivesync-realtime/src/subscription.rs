//! Topic subscriptions with cache reconciliation and handler fan-out.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use hivesync_cache::PresenceStore;
use hivesync_entity::presence::PresenceUpdate;

use crate::channel::RealtimeChannel;
use crate::message::WireMessage;
use crate::topic;

/// Callback invoked with every accepted update on a subscribed topic.
pub type UpdateHandler = Arc<dyn Fn(PresenceUpdate) + Send + Sync>;

/// Live handlers for one topic, shared with its pump task.
type HandlerMap = Arc<DashMap<u64, UpdateHandler>>;

struct TopicState {
    handlers: HandlerMap,
    pump: JoinHandle<()>,
}

impl std::fmt::Debug for TopicState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicState")
            .field("handlers", &self.handlers.len())
            .field("pump", &self.pump)
            .finish()
    }
}

/// State shared between the manager and the subscription handles it
/// creates, so a handle can outlive the manager reference it came from.
#[derive(Debug)]
struct Inner {
    channel: Arc<dyn RealtimeChannel>,
    store: Arc<PresenceStore>,
    topics: DashMap<String, TopicState>,
    next_handler_id: AtomicU64,
}

/// Routes inbound channel traffic into the presence store and out to
/// local handlers.
///
/// One pump task runs per subscribed topic. Every inbound update is merged
/// into the store before any handler sees it; updates older than what the
/// store already holds are dropped without invoking handlers. Heartbeats
/// refresh the store but are never fanned out.
#[derive(Debug)]
pub struct SubscriptionManager {
    inner: Arc<Inner>,
}

impl SubscriptionManager {
    pub fn new(channel: Arc<dyn RealtimeChannel>, store: Arc<PresenceStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                channel,
                store,
                topics: DashMap::new(),
                next_handler_id: AtomicU64::new(0),
            }),
        }
    }

    /// Register a handler for a topic.
    ///
    /// When the channel is disconnected nothing is subscribed and the
    /// returned [`Subscription`] is inert; callers re-subscribe after the
    /// channel reconnects.
    pub fn subscribe(&self, topic: &str, handler: UpdateHandler) -> Subscription {
        let inner = &self.inner;
        if !inner.channel.is_connected() {
            warn!("Channel not connected; subscription to '{topic}' not established");
            return Subscription::inert(topic);
        }

        let handler_id = inner.next_handler_id.fetch_add(1, Ordering::Relaxed);
        let entry = match inner.topics.entry(topic.to_string()) {
            Entry::Occupied(entry) => entry.into_ref(),
            Entry::Vacant(entry) => {
                let receiver = match inner.channel.subscribe(topic) {
                    Ok(receiver) => receiver,
                    Err(e) => {
                        warn!("Subscribing to '{topic}' failed: {e}");
                        return Subscription::inert(topic);
                    }
                };
                let handlers: HandlerMap = Arc::new(DashMap::new());
                let pump = tokio::spawn(Self::pump(
                    topic.to_string(),
                    receiver,
                    Arc::clone(&inner.store),
                    Arc::clone(&handlers),
                ));
                entry.insert(TopicState { handlers, pump })
            }
        };
        entry.value().handlers.insert(handler_id, handler);
        debug!("Subscribed handler {handler_id} to '{topic}'");

        Subscription {
            inner: Some(Arc::clone(inner)),
            topic: topic.to_string(),
            handler_id,
            active: AtomicBool::new(true),
        }
    }

    /// Drop every subscription and stop every pump task.
    ///
    /// Safe to call repeatedly; outstanding [`Subscription`] values become
    /// inert.
    pub fn unsubscribe_all(&self) {
        self.inner.topics.retain(|topic, state| {
            state.pump.abort();
            self.inner.channel.unsubscribe(topic);
            false
        });
    }

    /// Number of topics with at least one live handler.
    pub fn topic_count(&self) -> usize {
        self.inner.topics.len()
    }

    async fn pump(
        topic_name: String,
        mut receiver: broadcast::Receiver<WireMessage>,
        store: Arc<PresenceStore>,
        handlers: HandlerMap,
    ) {
        loop {
            match receiver.recv().await {
                Ok(WireMessage::PresenceUpdate(update)) => {
                    let accepted = store.apply_update(&update);
                    if !accepted {
                        trace!("Dropping stale update for {} on '{topic_name}'", update.user_id);
                        continue;
                    }
                    if let Some(hive_id) = topic::parse_hive(&topic_name) {
                        store.apply_update_to_hive(hive_id, &update);
                    }
                    for handler in handlers.iter() {
                        handler.value()(update.clone());
                    }
                }
                Ok(WireMessage::Heartbeat(heartbeat)) => {
                    store.apply_heartbeat(&heartbeat);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Subscription to '{topic_name}' lagged, skipped {skipped} messages");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Channel closed for '{topic_name}'; pump ending");
                    break;
                }
            }
        }
    }
}

impl Inner {
    fn remove_handler(&self, topic: &str, handler_id: u64) {
        let emptied = {
            let Some(state) = self.topics.get(topic) else {
                return;
            };
            state.handlers.remove(&handler_id);
            state.handlers.is_empty()
        };
        if emptied {
            // Re-check under the removal lock; a new handler may have
            // registered in between.
            if let Some((_, state)) = self
                .topics
                .remove_if(topic, |_, state| state.handlers.is_empty())
            {
                state.pump.abort();
                self.channel.unsubscribe(topic);
                debug!("Last handler gone; unsubscribed '{topic}'");
            }
        }
    }
}

/// Handle to one registered handler; dropping it does NOT unsubscribe.
#[derive(Debug)]
pub struct Subscription {
    inner: Option<Arc<Inner>>,
    topic: String,
    handler_id: u64,
    active: AtomicBool,
}

impl Subscription {
    fn inert(topic: &str) -> Self {
        Self {
            inner: None,
            topic: topic.to_string(),
            handler_id: 0,
            active: AtomicBool::new(false),
        }
    }

    /// The topic this subscription was requested for.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Whether the handler is still registered.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Deregister the handler. Idempotent; the second call is a no-op.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(inner) = &self.inner {
            inner.remove_handler(&self.topic, self.handler_id);
        }
    }
}
