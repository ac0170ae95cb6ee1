//! Refresh event bus
//!
//! Records changed elsewhere are announced on a named channel. Subscribers
//! that currently show the record reload; everyone else ignores the event.
//! Dropping a [`RefreshSubscription`] unsubscribes.

use grid_store::RecordId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

/// "Record changed" notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshEvent {
    pub record_id: RecordId,
}

impl RefreshEvent {
    #[inline]
    #[must_use]
    pub fn new(record_id: impl Into<RecordId>) -> Self {
        Self {
            record_id: record_id.into(),
        }
    }
}

/// Broadcast channel for refresh events
#[derive(Debug, Clone)]
pub struct RefreshBus {
    channel: String,
    sender: broadcast::Sender<RefreshEvent>,
}

impl RefreshBus {
    /// Create bus buffering up to `capacity` undelivered events per subscriber
    #[must_use]
    pub fn new(channel: impl Into<String>, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            channel: channel.into(),
            sender,
        }
    }

    /// Channel name
    #[inline]
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Publish event, returning the number of subscribers it reached
    pub fn publish(&self, event: RefreshEvent) -> usize {
        let delivered = self.sender.send(event).unwrap_or(0);
        tracing::debug!("{}: event delivered to {} subscribers", self.channel, delivered);
        delivered
    }

    /// Subscribe to subsequent events
    #[must_use]
    pub fn subscribe(&self) -> RefreshSubscription {
        tracing::debug!("{}: subscribed", self.channel);
        RefreshSubscription {
            channel: self.channel.clone(),
            receiver: self.sender.subscribe(),
        }
    }

    /// Current subscriber count
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Live subscription to a [`RefreshBus`]
#[derive(Debug)]
pub struct RefreshSubscription {
    channel: String,
    receiver: broadcast::Receiver<RefreshEvent>,
}

impl RefreshSubscription {
    /// Wait for the next event; `None` once the bus is gone.
    ///
    /// Events lost to a slow subscriber are skipped with a warning.
    pub async fn recv(&mut self) -> Option<RefreshEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!("{}: subscriber lagged, {} events skipped", self.channel, missed);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next already-published event, if any
    pub fn try_recv(&mut self) -> Option<RefreshEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(missed)) => {
                    tracing::warn!("{}: subscriber lagged, {} events skipped", self.channel, missed);
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for RefreshSubscription {
    fn drop(&mut self) {
        tracing::debug!("{}: unsubscribed", self.channel);
    }
}
