//! Fan-out and stale-rejection scenarios over the realtime channel.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;

use hivesync_core::types::{HiveId, UserId};
use hivesync_entity::presence::{PresenceStatus, PresenceUpdate};
use hivesync_realtime::channel::RealtimeChannel;
use hivesync_realtime::{UpdateHandler, WireMessage, topic};

use common::TestEngine;

fn collecting_handler() -> (UpdateHandler, mpsc::UnboundedReceiver<PresenceUpdate>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handler: UpdateHandler = Arc::new(move |update| {
        let _ = tx.send(update);
    });
    (handler, rx)
}

fn update(user_id: UserId, status: PresenceStatus) -> PresenceUpdate {
    PresenceUpdate {
        user_id,
        status,
        activity: None,
        timestamp: Utc::now(),
    }
}

#[tokio::test]
async fn test_two_subscribers_each_receive_one_inbound_update() {
    let t = TestEngine::new();
    let hive_id = HiveId::new();

    let (handler_a, mut rx_a) = collecting_handler();
    let (handler_b, mut rx_b) = collecting_handler();
    let sub_a = t.engine.subscribe_hive(hive_id, handler_a);
    let sub_b = t.engine.subscribe_hive(hive_id, handler_b);

    let user_id = UserId::new();
    t.channel
        .publish(
            &topic::hive_presence(hive_id),
            WireMessage::PresenceUpdate(update(user_id, PresenceStatus::Online)),
        )
        .await
        .expect("publish");
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert_eq!(rx_a.try_recv().expect("handler a invoked").user_id, user_id);
    assert_eq!(rx_b.try_recv().expect("handler b invoked").user_id, user_id);
    assert!(rx_a.try_recv().is_err(), "exactly once per handler");
    assert!(rx_b.try_recv().is_err(), "exactly once per handler");

    sub_a.unsubscribe();
    sub_b.unsubscribe();
}

#[tokio::test]
async fn test_stale_inbound_update_leaves_cache_unchanged() {
    let t = TestEngine::new();
    let user_id = UserId::new();
    let user_topic = topic::user_presence(user_id);

    let (handler, mut rx) = collecting_handler();
    let sub = t.engine.subscribe_user(user_id, handler);

    let fresh = update(user_id, PresenceStatus::Focusing);
    let mut stale = update(user_id, PresenceStatus::Away);
    stale.timestamp = fresh.timestamp - chrono::Duration::seconds(10);

    t.channel
        .publish(&user_topic, WireMessage::PresenceUpdate(fresh.clone()))
        .await
        .expect("publish");
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(rx.try_recv().is_ok());
    let cached = t.engine.store().get_user(user_id).expect("cached");

    t.channel
        .publish(&user_topic, WireMessage::PresenceUpdate(stale))
        .await
        .expect("publish");
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert!(rx.try_recv().is_err(), "stale update must not reach handlers");
    assert_eq!(
        t.engine.store().get_user(user_id),
        Some(cached),
        "cache unchanged by stale update"
    );
    sub.unsubscribe();
}

#[tokio::test]
async fn test_unsubscribe_twice_does_not_panic() {
    let t = TestEngine::new();
    let (handler, _rx) = collecting_handler();
    let sub = t.engine.subscribe_user(UserId::new(), handler);

    sub.unsubscribe();
    sub.unsubscribe();
    assert!(!sub.is_active());
}

#[tokio::test]
async fn test_subscribe_on_disconnected_channel_is_inert() {
    let t = TestEngine::new();
    t.channel.set_connected(false);

    let (handler, mut rx) = collecting_handler();
    let sub = t.engine.subscribe_hive(HiveId::new(), handler);
    assert!(!sub.is_active());

    // Reconnect and publish; the inert subscription must stay silent.
    t.channel.set_connected(true);
    t.channel
        .publish(
            &topic::hive_presence(HiveId::new()),
            WireMessage::PresenceUpdate(update(UserId::new(), PresenceStatus::Online)),
        )
        .await
        .expect("publish");
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_own_mutation_reaches_hive_subscribers() {
    let t = TestEngine::new();
    let hive_id = HiveId::new();
    t.engine.local().add_active_hive(hive_id).await;

    let (handler, mut rx) = collecting_handler();
    let sub = t.engine.subscribe_hive(hive_id, handler);

    t.engine
        .presence()
        .set_presence(hivesync_entity::presence::SetPresenceRequest::status(
            PresenceStatus::Focusing,
        ))
        .await
        .expect("set_presence");
    tokio::time::sleep(Duration::from_millis(30)).await;

    let seen = rx.try_recv().expect("subscriber saw own broadcast");
    assert_eq!(seen.user_id, t.user_id);
    assert_eq!(seen.status, PresenceStatus::Focusing);
    sub.unsubscribe();
}
