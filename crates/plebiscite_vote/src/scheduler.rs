//! Cancellable one-shot expiration timers keyed by vote.

use parking_lot::Mutex;
use plebiscite_interface::MessageId;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

struct PendingTimer {
    token: u64,
    handle: JoinHandle<()>,
}

/// Map from vote id to the task that will expire it.
///
/// The map lock is synchronous and never held across an `.await`. A timer that
/// fires first removes its own entry, and only if the entry still carries its
/// token, so a replaced or cancelled timer never disturbs its successor.
#[derive(Clone, Default)]
pub struct ExpirationScheduler {
    timers: Arc<Mutex<HashMap<MessageId, PendingTimer>>>,
    next_token: Arc<AtomicU64>,
}

impl std::fmt::Debug for ExpirationScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpirationScheduler")
            .field("pending", &self.len())
            .finish()
    }
}

impl ExpirationScheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` once after `delay`, replacing any timer already armed for
    /// `message_id`.
    #[instrument(skip(self, action))]
    pub fn schedule<F, Fut>(&self, message_id: MessageId, delay: Duration, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let timers = Arc::clone(&self.timers);

        let mut guard = self.timers.lock();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut timers = timers.lock();
                match timers.get(&message_id) {
                    Some(pending) if pending.token == token => {
                        timers.remove(&message_id);
                    }
                    _ => return,
                }
            }
            debug!(%message_id, "Expiration timer fired");
            action().await;
        });

        if let Some(old) = guard.insert(message_id, PendingTimer { token, handle }) {
            debug!("Replacing existing timer");
            old.handle.abort();
        }
    }

    /// Drop the timer for `message_id`. Returns whether one was pending.
    #[instrument(skip(self))]
    pub fn cancel(&self, message_id: MessageId) -> bool {
        match self.timers.lock().remove(&message_id) {
            Some(pending) => {
                pending.handle.abort();
                debug!("Timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Whether a timer is pending for `message_id`.
    pub fn is_scheduled(&self, message_id: MessageId) -> bool {
        self.timers.lock().contains_key(&message_id)
    }

    /// Ids with a pending timer.
    pub fn scheduled(&self) -> Vec<MessageId> {
        self.timers.lock().keys().copied().collect()
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.timers.lock().len()
    }

    /// Whether no timer is pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Abort every pending timer and return how many there were.
    #[instrument(skip(self))]
    pub fn shutdown(&self) -> usize {
        let drained: Vec<PendingTimer> = self.timers.lock().drain().map(|(_, p)| p).collect();
        for pending in &drained {
            pending.handle.abort();
        }
        info!(aborted = drained.len(), "Expiration scheduler shut down");
        drained.len()
    }
}
