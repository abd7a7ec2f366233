use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{RwLock, broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::models::User;
use crate::services::{ServiceError, UserService};
use crate::signal::{RefreshSignal, UsersChanged};

/// Users from one fetch, tagged with the order in which that fetch started.
struct Snapshot {
    seq: u64,
    users: Arc<Vec<User>>,
}

/// Holds the most recent successful listing and refetches on "users changed".
pub struct ListingController {
    service: Arc<dyn UserService>,
    users: RwLock<Snapshot>,
    next_fetch: AtomicU64,
    synced: watch::Sender<u64>,
}

impl ListingController {
    pub fn new(service: Arc<dyn UserService>) -> Self {
        let (synced, _) = watch::channel(0);
        Self {
            service,
            users: RwLock::new(Snapshot {
                seq: 0,
                users: Arc::new(Vec::new()),
            }),
            next_fetch: AtomicU64::new(0),
            synced,
        }
    }

    /// Snapshot of the current listing.
    pub async fn users(&self) -> Arc<Vec<User>> {
        self.users.read().await.users.clone()
    }

    /// Pull the list again and return how many users came back.
    ///
    /// A failure is logged and the previous listing kept. When fetches
    /// overlap, a response is only applied if no later-started fetch has
    /// landed first.
    pub async fn refetch(&self) -> Result<usize, ServiceError> {
        let seq = self.next_fetch.fetch_add(1, Ordering::Relaxed) + 1;
        match self.service.list().await {
            Ok(users) => {
                let count = users.len();
                let mut current = self.users.write().await;
                if current.seq > seq {
                    debug!(seq, newer = current.seq, "Dropping listing from an older fetch");
                    return Ok(count);
                }
                *current = Snapshot {
                    seq,
                    users: Arc::new(users),
                };
                debug!(count, seq, "Listing refreshed");
                Ok(count)
            }
            Err(e) => {
                error!(error = %e, "Error fetching users");
                Err(e)
            }
        }
    }

    /// Generation of the last change event this listing has handled.
    pub fn synced(&self) -> watch::Receiver<u64> {
        self.synced.subscribe()
    }

    /// Fetch once, then refetch for every event on `events` until the channel closes.
    pub async fn run(self: Arc<Self>, mut events: broadcast::Receiver<UsersChanged>) {
        let _ = self.refetch().await;
        loop {
            match events.recv().await {
                Ok(event) => {
                    debug!(generation = event.generation, "Users changed, refetching");
                    let _ = self.refetch().await;
                    self.synced.send_replace(event.generation);
                }
                Err(RecvError::Lagged(skipped)) => {
                    // One refetch covers every missed change.
                    warn!(skipped, "Listing fell behind change events");
                    let _ = self.refetch().await;
                }
                Err(RecvError::Closed) => break,
            }
        }
        debug!("Change channel closed, listing stopped");
    }

    /// Subscribe to `signal` and run the listing loop in the background.
    pub fn spawn(self: &Arc<Self>, signal: &RefreshSignal) -> JoinHandle<()> {
        let events = signal.subscribe();
        tokio::spawn(Arc::clone(self).run(events))
    }
}
