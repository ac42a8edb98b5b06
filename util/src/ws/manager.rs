//! A thread-safe WebSocket manager for topic-based message broadcasting.
//!
//! Uses Tokio broadcast channels per topic. Delivery is best effort: subscribers that
//! are not connected when a message is sent never see it, and lagging ones may miss some.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

type Topic = String;

type Sender = broadcast::Sender<String>;

type Receiver = broadcast::Receiver<String>;

/// Per-topic channel capacity before slow receivers start lagging.
const CHANNEL_CAPACITY: usize = 100;

/// Manages broadcast channels per topic.
///
/// - Lazily creates broadcast channels per topic on first subscription
/// - Removes topics when their subscriber count drops to zero after sending
#[derive(Clone, Default)]
pub struct WebSocketManager {
    inner: Arc<RwLock<HashMap<Topic, Sender>>>,
}

impl WebSocketManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to the given topic, creating it if necessary.
    pub async fn subscribe(&self, topic: &str) -> Receiver {
        let mut map = self.inner.write().await;
        map.entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Broadcasts a message to all current subscribers of `topic` and returns how many
    /// received it.
    ///
    /// If the topic does not exist, it's a no-op. If the topic has zero subscribers after
    /// sending, it is removed.
    pub async fn broadcast<T: Into<String>>(&self, topic: &str, msg: T) -> usize {
        let mut map = self.inner.write().await;
        let Some(sender) = map.get(topic) else {
            return 0;
        };
        let reached = sender.send(msg.into()).unwrap_or(0);
        if sender.receiver_count() == 0 {
            tracing::debug!("Removing topic '{topic}' due to no subscribers.");
            map.remove(topic);
        }
        reached
    }

    /// Number of live receivers on `topic`.
    pub async fn subscriber_count(&self, topic: &str) -> usize {
        self.inner
            .read()
            .await
            .get(topic)
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }

    pub async fn has_topic(&self, topic: &str) -> bool {
        self.inner.read().await.contains_key(topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{Duration, timeout};

    #[tokio::test]
    async fn it_broadcasts_to_all_subscribers() {
        let manager = WebSocketManager::new();
        let topic = "tag_change";

        let mut r1 = manager.subscribe(topic).await;
        let mut r2 = manager.subscribe(topic).await;

        assert_eq!(manager.broadcast(topic, "hello world").await, 2);

        let msg1 = timeout(Duration::from_millis(50), r1.recv())
            .await
            .unwrap()
            .unwrap();
        let msg2 = timeout(Duration::from_millis(50), r2.recv())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(msg1, "hello world");
        assert_eq!(msg2, "hello world");
    }

    #[tokio::test]
    async fn it_creates_topic_lazily() {
        let manager = WebSocketManager::new();
        assert!(!manager.has_topic("lazy-create").await);
        let _rx = manager.subscribe("lazy-create").await;
        assert!(manager.has_topic("lazy-create").await);
        assert_eq!(manager.subscriber_count("lazy-create").await, 1);
    }

    #[tokio::test]
    async fn broadcast_without_subscribers_reaches_nobody() {
        let manager = WebSocketManager::new();
        assert_eq!(manager.broadcast("no-subscribers", "silent").await, 0);
    }

    #[tokio::test]
    async fn topic_is_removed_after_broadcast_if_no_subscribers() {
        let manager = WebSocketManager::new();
        let topic = "ephemeral-topic";
        drop(manager.subscribe(topic).await);
        manager.broadcast(topic, "cleanup").await;
        assert!(!manager.has_topic(topic).await);
    }

    #[tokio::test]
    async fn late_subscribers_do_not_see_earlier_messages() {
        let manager = WebSocketManager::new();
        let _early = manager.subscribe("t").await;
        manager.broadcast("t", "first").await;
        let mut late = manager.subscribe("t").await;
        manager.broadcast("t", "second").await;
        assert_eq!(late.recv().await.unwrap(), "second");
    }
}
