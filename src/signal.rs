//! "Users changed" events, published by the create flow and consumed by listings.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;

use crate::models::User;

const CHANNEL_CAPACITY: usize = 16;

/// One successful write to the users collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsersChanged {
    /// Strictly increasing per signal, starting at 1.
    pub generation: u64,
    /// The record the server echoed back, if any.
    pub created: Option<User>,
}

/// Cloneable handle to a broadcast channel of [`UsersChanged`] events.
#[derive(Debug, Clone)]
pub struct RefreshSignal {
    sender: broadcast::Sender<UsersChanged>,
    generation: Arc<AtomicU64>,
}

impl Default for RefreshSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshSignal {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Publish a change and return its generation. Works with no subscribers.
    pub fn publish(&self, created: Option<User>) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let event = UsersChanged {
            generation,
            created,
        };
        if self.sender.send(event).is_err() {
            tracing::debug!(generation, "Users changed with no listing subscribed");
        }
        generation
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UsersChanged> {
        self.sender.subscribe()
    }

    /// Number of changes published so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
