//! Notification sink for player events.
//!
//! Pollers call [`Notifier::notify`] inline, so implementations must return
//! immediately and must never fail into the caller. Delivery (webhooks, chat
//! bridges) happens on the far side of the channel and is not handled here.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::conf::NotifyConfig;

/// Fire-and-forget notification target.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, event_kind: &str);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, message: &str, event_kind: &str) {
        (**self).notify(message, event_kind);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub message: String,
    pub event: String,
    pub timestamp: DateTime<Utc>,
}

/// Queues notifications on a bounded channel.
///
/// A full or closed channel drops the notification; ingestion never waits.
#[derive(Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<Notification>,
}

impl ChannelNotifier {
    pub fn new(queue_size: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(queue_size.max(1));
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, message: &str, event_kind: &str) {
        let notification = Notification {
            message: message.to_string(),
            event: event_kind.to_string(),
            timestamp: Utc::now(),
        };
        if let Err(e) = self.tx.try_send(notification) {
            debug!("Dropping {} notification: {}", event_kind, e);
        }
    }
}

/// Applies the per-event toggles before handing off to `inner`.
pub struct FilteredNotifier<N> {
    inner: N,
    config: NotifyConfig,
}

impl<N: Notifier> FilteredNotifier<N> {
    pub fn new(inner: N, config: NotifyConfig) -> Self {
        Self { inner, config }
    }

    fn enabled(&self, event_kind: &str) -> bool {
        match event_kind {
            "join" => self.config.join,
            "leave" => self.config.leave,
            _ => true,
        }
    }
}

impl<N: Notifier> Notifier for FilteredNotifier<N> {
    fn notify(&self, message: &str, event_kind: &str) {
        if self.enabled(event_kind) {
            self.inner.notify(message, event_kind);
        }
    }
}

/// Drain queued notifications into the log until every sender is gone.
pub async fn log_notifications(mut rx: mpsc::Receiver<Notification>) {
    while let Some(notification) = rx.recv().await {
        info!(
            event = %notification.event,
            at = %notification.timestamp.to_rfc3339(),
            "{}",
            notification.message
        );
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Notifier;
    use parking_lot::Mutex;

    /// Records every notification it receives.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub seen: Mutex<Vec<(String, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, message: &str, event_kind: &str) {
            self.seen.lock().push((message.to_string(), event_kind.to_string()));
        }
    }
}
