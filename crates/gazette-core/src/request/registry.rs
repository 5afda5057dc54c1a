//! Per-user registry of pending requests with timeout eviction.
//!
//! Holds at most one in-flight request per user. Inserting schedules an
//! eviction timer; resolving removes the request and disarms the timer.
//! An eviction that fires concurrently with a resolve is a no-op on the
//! losing side: entries carry a generation stamp, and the eviction only
//! removes the entry whose generation it was armed for, never a newer
//! request that reused the same user key.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use gazette_types::identity::{ChatId, MessageId, UserId};
use tracing::debug;

use crate::request::{Payload, PendingRequest, RequestKind};
use crate::sched::OneshotScheduler;
use crate::workflow::Workflow;

/// Outcome of a mark-pending call.
///
/// Contention is a normal result, not an error: when the user already has
/// an in-flight request, the conflicting kind is reported so the caller
/// can tell the user what is blocking. Callers must not retry
/// automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum MarkPending {
    /// The request was recorded and its eviction timer armed.
    Inserted,
    /// The user already had a pending request of the reported kind; the
    /// new request was not recorded.
    AlreadyPending(RequestKind),
}

impl MarkPending {
    /// Whether the request was recorded.
    pub fn inserted(&self) -> bool {
        matches!(self, MarkPending::Inserted)
    }
}

struct PendingEntry {
    request: Arc<PendingRequest>,
    generation: u64,
}

/// Per-user map of in-flight requests: at most one per user.
pub struct PendingRequests {
    entries: Arc<DashMap<UserId, PendingEntry>>,
    evictions: OneshotScheduler<UserId>,
    generation: AtomicU64,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            evictions: OneshotScheduler::new(),
            generation: AtomicU64::new(0),
        }
    }

    /// Record a new-session or resume-session intent for `user`.
    pub fn mark_standby(
        &self,
        workflow: Arc<Workflow>,
        user: UserId,
        chat: ChatId,
        topic: impl Into<String>,
        is_new: bool,
        timeout: Duration,
    ) -> MarkPending {
        self.mark(
            workflow,
            user,
            Payload::Standby {
                chat,
                topic: topic.into(),
                is_new,
            },
            timeout,
        )
    }

    /// Record an edit intent for `user`.
    pub fn mark_editing(
        &self,
        workflow: Arc<Workflow>,
        user: UserId,
        timeout: Duration,
    ) -> MarkPending {
        self.mark(workflow, user, Payload::Editing, timeout)
    }

    /// Record a list intent for `user`.
    pub fn mark_listing(
        &self,
        workflow: Arc<Workflow>,
        user: UserId,
        timeout: Duration,
    ) -> MarkPending {
        self.mark(workflow, user, Payload::Listing, timeout)
    }

    /// Record a delete intent for `user`.
    pub fn mark_deleting(
        &self,
        workflow: Arc<Workflow>,
        user: UserId,
        targets: impl Into<String>,
        timeout: Duration,
    ) -> MarkPending {
        self.mark(
            workflow,
            user,
            Payload::Deleting {
                targets: targets.into(),
            },
            timeout,
        )
    }

    fn mark(
        &self,
        workflow: Arc<Workflow>,
        user: UserId,
        payload: Payload,
        timeout: Duration,
    ) -> MarkPending {
        let kind = payload.kind();
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let entries = Arc::clone(&self.entries);

        match self.entries.entry(user) {
            Entry::Occupied(occupied) => {
                return MarkPending::AlreadyPending(occupied.get().request.kind());
            }
            Entry::Vacant(vacant) => {
                let guard = vacant.insert(PendingEntry {
                    request: Arc::new(PendingRequest::new(workflow, payload)),
                    generation,
                });
                // Arm the eviction while the entry guard is still held so
                // insert-and-arm is atomic with respect to resolve. The
                // generation stamp keeps a late firing from touching any
                // newer request that reuses this user key.
                self.evictions.schedule(user, timeout, move || {
                    if entries
                        .remove_if(&user, |_, entry| entry.generation == generation)
                        .is_some()
                    {
                        debug!(%user, "pending request evicted after timeout");
                    }
                });
                drop(guard);
            }
        }

        debug!(%user, %kind, ?timeout, "pending request recorded");
        MarkPending::Inserted
    }

    /// The pending session-standby request for `user`, if that is what is
    /// pending.
    pub fn standby(&self, user: UserId) -> Option<Arc<PendingRequest>> {
        self.get_kind(user, RequestKind::Standby)
    }

    /// The pending edit request for `user`, if that is what is pending.
    pub fn editing(&self, user: UserId) -> Option<Arc<PendingRequest>> {
        self.get_kind(user, RequestKind::Editing)
    }

    /// The pending list request for `user`, if that is what is pending.
    pub fn listing(&self, user: UserId) -> Option<Arc<PendingRequest>> {
        self.get_kind(user, RequestKind::Listing)
    }

    /// The pending delete request for `user`, if that is what is pending.
    pub fn deleting(&self, user: UserId) -> Option<Arc<PendingRequest>> {
        self.get_kind(user, RequestKind::Deleting)
    }

    fn get_kind(&self, user: UserId, kind: RequestKind) -> Option<Arc<PendingRequest>> {
        // Clone out of the map immediately; never hold a DashMap guard
        // past the return.
        self.entries
            .get(&user)
            .map(|entry| Arc::clone(&entry.request))
            .filter(|request| request.kind() == kind)
    }

    /// Atomically remove and return the pending request for `user`,
    /// disarming its eviction timer.
    ///
    /// Safe to call concurrently with the eviction firing: whichever side
    /// wins removes the entry, the other is a no-op.
    pub fn resolve(&self, user: UserId) -> Option<Arc<PendingRequest>> {
        let (_, entry) = self.entries.remove(&user)?;
        self.evictions.cancel(&user);
        debug!(%user, kind = %entry.request.kind(), "pending request resolved");
        Some(entry.request)
    }

    /// Record the prompt message `user` is expected to reply to, on the
    /// current pending request.
    ///
    /// Returns whether this call performed the set: `false` when no
    /// request is pending or the reply-to id was already recorded.
    pub fn mark_expecting_input(&self, user: UserId, prompt: MessageId) -> bool {
        match self.entries.get(&user) {
            Some(entry) => entry.request.expect_input(prompt),
            None => false,
        }
    }

    /// Number of users with a pending request.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no requests are pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PendingRequests {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PendingRequests {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequests")
            .field("pending", &self.entries.len())
            .field("armed_evictions", &self.evictions.armed())
            .finish()
    }
}
