//! # In-Memory Report Publisher
//!
//! Uses `tokio::sync::broadcast` so an in-process worker can subscribe to
//! report requests. The most recent messages, up to the channel capacity,
//! are also kept in a log for inspection. Distributed deployments would put a real message bus behind
//! the same port.

use crate::ports::{PublishError, ReportPublisher};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

/// One message handed to the publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub message_id: String,
    pub topic: String,
    pub data: Vec<u8>,
}

pub struct InMemoryPublisher {
    sender: broadcast::Sender<PublishedMessage>,
    /// Bounded to `capacity`; the oldest entry is dropped first.
    log: RwLock<VecDeque<PublishedMessage>>,
    capacity: usize,
    published: AtomicU64,
}

impl InMemoryPublisher {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            log: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
            published: AtomicU64::new(0),
        }
    }

    /// Receive every message published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedMessage> {
        self.sender.subscribe()
    }

    /// Copy of the retained messages, oldest first.
    pub fn messages(&self) -> Vec<PublishedMessage> {
        self.log.read().iter().cloned().collect()
    }

    pub fn messages_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportPublisher for InMemoryPublisher {
    async fn publish(&self, topic: &str, data: Vec<u8>) -> Result<String, PublishError> {
        let message = PublishedMessage {
            message_id: Uuid::new_v4().to_string(),
            topic: topic.to_string(),
            data,
        };
        let message_id = message.message_id.clone();

        {
            let mut log = self.log.write();
            if log.len() == self.capacity {
                log.pop_front();
            }
            log.push_back(message.clone());
        }
        self.published.fetch_add(1, Ordering::Relaxed);

        // No subscribers is not an error.
        let receivers = self.sender.send(message).unwrap_or(0);
        debug!(topic, message_id = %message_id, receivers, "report request published");

        Ok(message_id)
    }
}
