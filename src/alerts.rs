use tokio::sync::broadcast;

/// A transient, user-facing alert (the desktop/web equivalent is a toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
    /// Optional deep link ("View" action) into the product.
    pub action_url: Option<String>,
}

/// Fan-out sender for alerts. Cheap to clone; emitting with no subscribers
/// is fine, the alert is simply dropped after being logged.
#[derive(Clone)]
pub struct AlertSink {
    tx: broadcast::Sender<Alert>,
}

impl AlertSink {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Alert> {
        self.tx.subscribe()
    }

    pub fn emit(&self, alert: Alert) {
        tracing::debug!(
            title = %alert.title,
            action_url = alert.action_url.as_deref().unwrap_or(""),
            "alert emitted"
        );
        let _ = self.tx.send(alert);
    }
}

impl Default for AlertSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_receives_alert() {
        let sink = AlertSink::new();
        let mut rx = sink.subscribe();
        sink.emit(Alert {
            title: "Invited".into(),
            message: "You were invited".into(),
            action_url: Some("/x".into()),
        });
        let got = rx.try_recv().unwrap();
        assert_eq!(got.title, "Invited");
        assert_eq!(got.action_url.as_deref(), Some("/x"));
    }

    #[test]
    fn test_emit_without_subscribers_does_not_panic() {
        let sink = AlertSink::new();
        sink.emit(Alert {
            title: "t".into(),
            message: "m".into(),
            action_url: None,
        });
    }
}
