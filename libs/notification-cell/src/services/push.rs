use tokio::sync::broadcast;
use tracing::debug;

/// Live event from the push transport. The event itself is the trigger
/// and carries no payload; the feed re-pulls instead of merging (see
/// `NotificationFeed::on_push`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushEvent {
    NewNotification,
}

/// In-process fan-out for push events. Whatever owns the live transport
/// publishes here; the session subscribes and drives the feed.
pub struct PushChannel {
    sender: broadcast::Sender<PushEvent>,
}

impl PushChannel {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PushEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: PushEvent) {
        if let Err(e) = self.sender.send(event) {
            // No live subscribers; the next manual refresh catches up.
            debug!("push event dropped: {}", e);
        }
    }
}

impl Default for PushChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_published_events() {
        let channel = PushChannel::new();
        let mut receiver = channel.subscribe();
        channel.publish(PushEvent::NewNotification);
        assert_eq!(receiver.recv().await.unwrap(), PushEvent::NewNotification);
    }

    #[test]
    fn test_publish_without_subscribers_does_not_panic() {
        let channel = PushChannel::new();
        channel.publish(PushEvent::NewNotification);
    }
}
