//! Keyed one-shot timers for pending-request eviction.
//!
//! Wraps `tokio::time::sleep` behind a cancellable, keyed interface:
//! scheduling a key arms a timer task, cancelling it disarms the task.
//! Arming an already-armed key replaces (cancels) the previous timer.
//!
//! Cancellation is best-effort at the firing boundary: a timer whose
//! sleep has already elapsed may still run its callback concurrently with
//! `cancel`. Callers that need exactly-once effects must guard the
//! callback side (the pending-request registry stamps entries with a
//! generation counter for exactly this reason).

use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// An armed timer: its identity plus the token that disarms it.
struct Armed {
    id: u64,
    token: CancellationToken,
}

/// Keyed one-shot timer scheduler.
///
/// Each key holds at most one armed timer at a time.
pub struct OneshotScheduler<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    timers: Arc<DashMap<K, Armed>>,
    next_id: AtomicU64,
}

impl<K> OneshotScheduler<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            timers: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Arm a timer for `key`: after `delay`, `callback` runs unless the
    /// timer was cancelled or replaced first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, key: K, delay: Duration, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();

        if let Some(previous) = self.timers.insert(
            key.clone(),
            Armed {
                id,
                token: token.clone(),
            },
        ) {
            previous.token.cancel();
        }

        let timers = Arc::clone(&self.timers);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    trace!("timer cancelled before firing");
                }
                _ = tokio::time::sleep(delay) => {
                    // Disarm our own entry unless a newer timer replaced it.
                    timers.remove_if(&key, |_, armed| armed.id == id);
                    callback();
                }
            }
        });
    }

    /// Disarm the timer for `key`, if one is armed.
    ///
    /// Returns whether a timer was cancelled.
    pub fn cancel(&self, key: &K) -> bool {
        match self.timers.remove(key) {
            Some((_, armed)) => {
                armed.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Number of currently armed timers.
    pub fn armed(&self) -> usize {
        self.timers.len()
    }
}

impl<K> Default for OneshotScheduler<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> std::fmt::Debug for OneshotScheduler<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OneshotScheduler")
            .field("armed", &self.timers.len())
            .finish()
    }
}
