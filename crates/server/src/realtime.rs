// crates/server/src/realtime.rs
//! Per-student publish/subscribe channels for realtime status pushes.
//!
//! Delivery is at-most-once: there is no replay for late joiners and no
//! backpressure. Payloads are opaque strings; the broadcaster never looks
//! inside them.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// Identifies one connected client (one WebSocket).
pub type ConnectionId = Uuid;

/// Receiving end of a channel subscription created by [`Broadcaster::subscribe`].
pub struct Subscription {
    pub connection_id: ConnectionId,
    pub student_id: String,
    pub rx: mpsc::UnboundedReceiver<String>,
}

/// Process-wide realtime handle. Cheap to clone; all clones share channels.
#[derive(Clone, Default)]
pub struct Broadcaster {
    /// Subscribers keyed by student id, then by connection.
    channels: Arc<DashMap<String, HashMap<ConnectionId, mpsc::UnboundedSender<String>>>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `tx` to the student's channel under `connection_id`.
    ///
    /// A connection may join several channels with the same sender; joining
    /// the same channel twice replaces the earlier sender.
    pub fn join(
        &self,
        student_id: &str,
        connection_id: ConnectionId,
        tx: mpsc::UnboundedSender<String>,
    ) {
        self.channels
            .entry(student_id.to_string())
            .or_default()
            .insert(connection_id, tx);
        debug!(student_id = %student_id, %connection_id, "joined student channel");
    }

    /// Join with a fresh connection id and a dedicated receiver.
    pub fn subscribe(&self, student_id: &str) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection_id = Uuid::new_v4();
        self.join(student_id, connection_id, tx);
        Subscription {
            connection_id,
            student_id: student_id.to_string(),
            rx,
        }
    }

    pub fn unsubscribe(&self, student_id: &str, connection_id: ConnectionId) {
        if let Some(mut subscribers) = self.channels.get_mut(student_id) {
            subscribers.remove(&connection_id);
        }
        self.channels
            .remove_if(student_id, |_, subscribers| subscribers.is_empty());
        debug!(student_id = %student_id, %connection_id, "unsubscribed from student channel");
    }

    /// Fan `payload` out to every subscriber of the student's channel.
    ///
    /// Returns the number of subscribers the payload was handed to.
    /// Subscribers whose receiver is gone are dropped from the channel.
    pub fn publish(&self, student_id: &str, payload: &str) -> usize {
        let Some(mut subscribers) = self.channels.get_mut(student_id) else {
            return 0;
        };

        let before = subscribers.len();
        subscribers.retain(|_, tx| tx.send(payload.to_string()).is_ok());
        let delivered = subscribers.len();
        let now_empty = subscribers.is_empty();
        drop(subscribers);

        if delivered < before {
            debug!(
                student_id = %student_id,
                dropped = before - delivered,
                "pruned closed subscribers"
            );
        }
        if now_empty {
            self.channels
                .remove_if(student_id, |_, subscribers| subscribers.is_empty());
        }
        delivered
    }

    pub fn subscriber_count(&self, student_id: &str) -> usize {
        self.channels
            .get(student_id)
            .map(|subscribers| subscribers.len())
            .unwrap_or(0)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_only_that_student() {
        let realtime = Broadcaster::new();
        let mut a = realtime.subscribe("a");
        let mut b = realtime.subscribe("b");

        assert_eq!(realtime.publish("a", "hello"), 1);

        assert_eq!(a.rx.recv().await.as_deref(), Some("hello"));
        assert!(b.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_fans_out_to_every_subscriber() {
        let realtime = Broadcaster::new();
        let mut first = realtime.subscribe("s1");
        let mut second = realtime.subscribe("s1");

        assert_eq!(realtime.publish("s1", "update"), 2);
        assert_eq!(first.rx.recv().await.as_deref(), Some("update"));
        assert_eq!(second.rx.recv().await.as_deref(), Some("update"));
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let realtime = Broadcaster::new();
        assert_eq!(realtime.publish("nobody", "x"), 0);
        assert_eq!(realtime.channel_count(), 0);
    }

    #[test]
    fn test_no_replay_for_late_joiners() {
        let realtime = Broadcaster::new();
        realtime.publish("s1", "early");
        let mut late = realtime.subscribe("s1");
        assert!(late.rx.try_recv().is_err());
    }

    #[test]
    fn test_unsubscribe_removes_empty_channel() {
        let realtime = Broadcaster::new();
        let sub = realtime.subscribe("s1");
        assert_eq!(realtime.subscriber_count("s1"), 1);

        realtime.unsubscribe("s1", sub.connection_id);
        assert_eq!(realtime.subscriber_count("s1"), 0);
        assert_eq!(realtime.channel_count(), 0);
    }

    #[test]
    fn test_dropped_receiver_is_pruned_on_publish() {
        let realtime = Broadcaster::new();
        let gone = realtime.subscribe("s1");
        let _kept = realtime.subscribe("s1");
        drop(gone);

        assert_eq!(realtime.publish("s1", "x"), 1);
        assert_eq!(realtime.subscriber_count("s1"), 1);
    }

    #[test]
    fn test_one_connection_can_join_many_channels() {
        let realtime = Broadcaster::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let conn = Uuid::new_v4();
        realtime.join("s1", conn, tx.clone());
        realtime.join("s2", conn, tx);

        realtime.publish("s1", "one");
        realtime.publish("s2", "two");
        assert_eq!(rx.try_recv().as_deref(), Ok("one"));
        assert_eq!(rx.try_recv().as_deref(), Ok("two"));
    }
}
