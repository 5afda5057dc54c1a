//! The engine facade: both registries behind one constructed-once value.
//!
//! Command handlers hold a reference to a single `SessionEngine` built at
//! startup and reach every lifecycle operation through it. There is no
//! ambient global state; two engines are fully independent (useful for
//! tests and for running several bots in one process).

use std::sync::Arc;
use std::time::Duration;

use gazette_types::identity::{ChatId, MessageId, UserId};

use crate::publisher::BoxPublisher;
use crate::request::{MarkPending, PendingRequest, PendingRequests};
use crate::session::{ActivateError, ActiveSessions, Session};
use crate::workflow::Workflow;

/// Entry point to the session and pending-request lifecycle.
#[derive(Debug, Default)]
pub struct SessionEngine {
    pending: PendingRequests,
    sessions: ActiveSessions,
}

impl SessionEngine {
    pub fn new() -> Self {
        Self {
            pending: PendingRequests::new(),
            sessions: ActiveSessions::new(),
        }
    }

    /// The pending-request registry.
    pub fn pending(&self) -> &PendingRequests {
        &self.pending
    }

    /// The active-session registry.
    pub fn sessions(&self) -> &ActiveSessions {
        &self.sessions
    }

    // --- Pending requests ---

    /// Record a new-session or resume-session intent.
    pub fn mark_standby(
        &self,
        workflow: Arc<Workflow>,
        user: UserId,
        chat: ChatId,
        topic: impl Into<String>,
        is_new: bool,
        timeout: Duration,
    ) -> MarkPending {
        self.pending
            .mark_standby(workflow, user, chat, topic, is_new, timeout)
    }

    /// Record an edit intent.
    pub fn mark_editing(
        &self,
        workflow: Arc<Workflow>,
        user: UserId,
        timeout: Duration,
    ) -> MarkPending {
        self.pending.mark_editing(workflow, user, timeout)
    }

    /// Record a list intent.
    pub fn mark_listing(
        &self,
        workflow: Arc<Workflow>,
        user: UserId,
        timeout: Duration,
    ) -> MarkPending {
        self.pending.mark_listing(workflow, user, timeout)
    }

    /// Record a delete intent.
    pub fn mark_deleting(
        &self,
        workflow: Arc<Workflow>,
        user: UserId,
        targets: impl Into<String>,
        timeout: Duration,
    ) -> MarkPending {
        self.pending.mark_deleting(workflow, user, targets, timeout)
    }

    /// The user's pending standby request, if that is what is pending.
    pub fn standby_session(&self, user: UserId) -> Option<Arc<PendingRequest>> {
        self.pending.standby(user)
    }

    /// The user's pending edit request, if that is what is pending.
    pub fn pending_editing(&self, user: UserId) -> Option<Arc<PendingRequest>> {
        self.pending.editing(user)
    }

    /// The user's pending list request, if that is what is pending.
    pub fn pending_listing(&self, user: UserId) -> Option<Arc<PendingRequest>> {
        self.pending.listing(user)
    }

    /// The user's pending delete request, if that is what is pending.
    pub fn pending_deleting(&self, user: UserId) -> Option<Arc<PendingRequest>> {
        self.pending.deleting(user)
    }

    /// Remove and return the user's pending request, disarming its
    /// eviction timer.
    pub fn resolve_pending(&self, user: UserId) -> Option<Arc<PendingRequest>> {
        self.pending.resolve(user)
    }

    /// Record the prompt message the user is expected to reply to.
    pub fn mark_expecting_input(&self, user: UserId, prompt: MessageId) -> bool {
        self.pending.mark_expecting_input(user, prompt)
    }

    // --- Active sessions ---

    /// Consume the user's standby request and install a session for
    /// `chat`.
    pub fn activate_session(
        &self,
        workflow: Arc<Workflow>,
        user: UserId,
        chat: ChatId,
        publisher: BoxPublisher,
    ) -> Result<Arc<Session>, ActivateError> {
        self.sessions
            .activate(&self.pending, workflow, user, chat, publisher)
    }

    /// Remove and return the session for `chat`.
    pub fn deactivate_session(&self, chat: ChatId) -> Option<Arc<Session>> {
        self.sessions.deactivate(chat)
    }

    /// Non-mutating lookup of the session for `chat`.
    pub fn active_session(&self, chat: ChatId) -> Option<Arc<Session>> {
        self.sessions.get(chat)
    }
}
