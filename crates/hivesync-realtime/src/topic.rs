//! Topic name builders for all presence channels.
//!
//! Centralising topic construction prevents typos and makes it easy to
//! find every topic the engine uses.

use std::str::FromStr;

use hivesync_core::types::{HiveId, UserId};

/// Outbound destination for liveness announcements.
pub const HEARTBEAT: &str = "presence/heartbeat";

/// Topic carrying presence updates for a single user.
pub fn user_presence(user_id: UserId) -> String {
    format!("presence/user/{user_id}")
}

/// Topic carrying presence updates for all members of a hive.
pub fn hive_presence(hive_id: HiveId) -> String {
    format!("presence/hive/{hive_id}")
}

/// Extract the hive ID from a per-hive presence topic, if it is one.
pub fn parse_hive(topic: &str) -> Option<HiveId> {
    topic
        .strip_prefix("presence/hive/")
        .and_then(|id| HiveId::from_str(id).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_user_topic() {
        let id = UserId::from_uuid(Uuid::nil());
        assert_eq!(
            user_presence(id),
            "presence/user/00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_parse_hive_roundtrip() {
        let id = HiveId::new();
        assert_eq!(parse_hive(&hive_presence(id)), Some(id));
    }

    #[test]
    fn test_parse_rejects_foreign_topics() {
        assert!(parse_hive("presence/user/not-a-hive").is_none());
        assert!(parse_hive(HEARTBEAT).is_none());
        assert!(parse_hive("presence/hive/not-a-uuid").is_none());
    }
}
