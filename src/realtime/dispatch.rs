use serde::Deserialize;

use crate::alerts::{Alert, AlertSink};
use crate::api::keys;
use crate::cache::QueryCache;

/// Wire envelope for pushed events: `{type, data}`.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// The pushed payload, decoded leniently: the server never guarantees the
/// full REST notification shape on the socket, and the alert only needs the
/// display fields. Everything else rides along in the cache refresh.
#[derive(Debug, Deserialize)]
struct PushedNotification {
    title: String,
    message: String,
    #[serde(default)]
    action_url: Option<String>,
}

/// What a frame did, for the socket loop's trace events and for tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Alert emitted and notification partitions invalidated.
    Notification,
    /// Valid envelope, unrecognized `type`. No-op.
    Ignored,
    /// Malformed JSON or malformed payload. No-op, logged.
    ParseError,
}

/// Handle one inbound text frame.
///
/// A recognized notification emits exactly one alert and invalidates the
/// notification cache partitions exactly once. Cached entries are never
/// mutated directly; the REST list stays the source of truth.
pub fn dispatch_frame(text: &str, cache: &QueryCache, alerts: &AlertSink) -> Dispatch {
    let envelope: Envelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!(error = %e, "failed to parse pushed frame");
            return Dispatch::ParseError;
        }
    };

    if envelope.kind != "notification" {
        tracing::debug!(kind = %envelope.kind, "ignoring pushed frame of unrecognized type");
        return Dispatch::Ignored;
    }

    let pushed: PushedNotification = match serde_json::from_value(envelope.data) {
        Ok(pushed) => pushed,
        Err(e) => {
            tracing::warn!(error = %e, "notification frame with malformed data");
            return Dispatch::ParseError;
        }
    };

    alerts.emit(Alert {
        title: pushed.title,
        message: pushed.message,
        action_url: pushed.action_url,
    });
    cache.invalidate(keys::NOTIFICATIONS);

    Dispatch::Notification
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (QueryCache, AlertSink) {
        let cache = QueryCache::new();
        cache.set(keys::NOTIFICATIONS, &serde_json::json!([{"id": "n0"}]));
        cache.set(keys::UNREAD_COUNT, &3u64);
        (cache, AlertSink::new())
    }

    #[test]
    fn test_notification_frame_alerts_and_invalidates_once() {
        let (cache, alerts) = fixture();
        let mut rx = alerts.subscribe();

        let frame = r#"{"type":"notification","data":{"id":"n1","title":"Invited","message":"You were invited","action_url":"/x"}}"#;
        assert_eq!(dispatch_frame(frame, &cache, &alerts), Dispatch::Notification);

        let alert = rx.try_recv().unwrap();
        assert_eq!(alert.title, "Invited");
        assert_eq!(alert.message, "You were invited");
        assert_eq!(alert.action_url.as_deref(), Some("/x"));
        assert!(rx.try_recv().is_err(), "exactly one alert");

        assert_eq!(cache.invalidations(), 1);
        assert!(cache.get::<serde_json::Value>(keys::NOTIFICATIONS).is_none());
        assert!(cache.get::<u64>(keys::UNREAD_COUNT).is_none());
    }

    #[test]
    fn test_cached_entries_are_not_mutated() {
        let (cache, alerts) = fixture();
        let frame = r#"{"type":"notification","data":{"id":"n1","title":"T","message":"M"}}"#;
        dispatch_frame(frame, &cache, &alerts);

        // Entries are marked stale, not rewritten with the pushed payload.
        assert_eq!(cache.len(), 2);
        assert!(cache.is_stale(keys::NOTIFICATIONS));
    }

    #[test]
    fn test_unrecognized_type_is_a_noop() {
        let (cache, alerts) = fixture();
        let mut rx = alerts.subscribe();

        let frame = r#"{"type":"presence","data":{"user":"u1"}}"#;
        assert_eq!(dispatch_frame(frame, &cache, &alerts), Dispatch::Ignored);

        assert!(rx.try_recv().is_err());
        assert_eq!(cache.invalidations(), 0);
        assert!(cache.get::<serde_json::Value>(keys::NOTIFICATIONS).is_some());
    }

    #[test]
    fn test_malformed_json_is_a_noop() {
        let (cache, alerts) = fixture();
        let mut rx = alerts.subscribe();

        assert_eq!(
            dispatch_frame("{not json", &cache, &alerts),
            Dispatch::ParseError
        );
        assert!(rx.try_recv().is_err());
        assert_eq!(cache.invalidations(), 0);
    }

    #[test]
    fn test_notification_without_display_fields_is_a_noop() {
        let (cache, alerts) = fixture();
        let frame = r#"{"type":"notification","data":{"id":"n1"}}"#;
        assert_eq!(
            dispatch_frame(frame, &cache, &alerts),
            Dispatch::ParseError
        );
        assert_eq!(cache.invalidations(), 0);
    }

    #[test]
    fn test_action_url_is_optional() {
        let (cache, alerts) = fixture();
        let mut rx = alerts.subscribe();
        let frame = r#"{"type":"notification","data":{"title":"T","message":"M"}}"#;
        assert_eq!(dispatch_frame(frame, &cache, &alerts), Dispatch::Notification);
        assert!(rx.try_recv().unwrap().action_url.is_none());
    }
}
