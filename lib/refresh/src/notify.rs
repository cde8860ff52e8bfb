use tokio::sync::broadcast;
use tracing::debug;

use crate::coordinator::CycleOutcome;

/// Receives the outcome of every finished refresh cycle, successful or not.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, outcome: &CycleOutcome);
}

/// Fans outcomes out to any number of subscribers.
///
/// Subscribers that fall more than `capacity` outcomes behind skip the oldest
/// ones. Publishing with no subscribers is fine.
pub struct BroadcastSink {
    sender: broadcast::Sender<CycleOutcome>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CycleOutcome> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(16)
    }
}

impl NotificationSink for BroadcastSink {
    fn publish(&self, outcome: &CycleOutcome) {
        let delivered = self.sender.send(outcome.clone()).unwrap_or(0);
        debug!(subscribers = delivered, "refresh outcome published");
    }
}

/// Drops every outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn publish(&self, _outcome: &CycleOutcome) {}
}
