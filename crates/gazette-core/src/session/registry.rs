//! Per-chat registry of active sessions and the activation handshake.
//!
//! Activation consumes exactly one matching standby request from the
//! pending-request registry and installs a session for the chat the
//! request was opened for. The two registries share no lock except the
//! narrow critical section here, which makes "consume the request" and
//! "install the session" appear atomic with respect to other activations
//! targeting the same chat.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use gazette_types::identity::{ChatId, UserId};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{info, warn};

use crate::publisher::BoxPublisher;
use crate::request::{Payload, PendingRequests, RequestKind};
use crate::session::Session;
use crate::workflow::Workflow;

/// Errors from the activation handshake.
///
/// All of these are expected runtime outcomes (a race with timer
/// eviction, adapter misuse, a concurrent activation); none are fatal to
/// the process. On every failure path the consumed pending request is
/// gone -- activation fails closed and does not restore it.
#[derive(Debug, Error)]
pub enum ActivateError {
    /// No pending session request for the user. Either it was never
    /// recorded or the eviction timer won the race.
    #[error("no pending session request for user {0}")]
    RequestNotFound(UserId),

    /// The pending request was not a session-standby request. The two
    /// kinds are mutually exclusive per user, so this indicates a data
    /// race or adapter misuse; it is reported, not panicked on.
    #[error("conflicting pending request of kind '{0}'")]
    ConflictingKind(RequestKind),

    /// The request was opened for a different chat than the one being
    /// activated.
    #[error("session request was opened for chat {expected}, not chat {got}")]
    ChatMismatch { expected: ChatId, got: ChatId },

    /// The chat already has a live session. The existing session is
    /// returned so the caller can detect the race without the registry
    /// overwriting live state.
    #[error("chat already has an active session")]
    AlreadyActive { existing: Arc<Session> },
}

/// Per-chat map of live sessions: at most one per chat.
pub struct ActiveSessions {
    sessions: DashMap<ChatId, Arc<Session>>,
    /// Narrow critical section for the activation handshake only; plain
    /// lookups and deactivation go straight to the map.
    activation: Mutex<()>,
}

impl ActiveSessions {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            activation: Mutex::new(()),
        }
    }

    /// Consume the user's standby request and install a session for
    /// `chat`.
    ///
    /// The request must exist, be of the standby kind, and have been
    /// opened for `chat`; otherwise the matching [`ActivateError`] is
    /// returned and the consumed request is not restored.
    pub fn activate(
        &self,
        pending: &PendingRequests,
        workflow: Arc<Workflow>,
        user: UserId,
        chat: ChatId,
        publisher: BoxPublisher,
    ) -> Result<Arc<Session>, ActivateError> {
        let _guard = self.activation.lock();

        let request = pending
            .resolve(user)
            .ok_or(ActivateError::RequestNotFound(user))?;

        let (recorded, topic, is_new) = match request.payload() {
            Payload::Standby {
                chat,
                topic,
                is_new,
            } => (*chat, topic.clone(), *is_new),
            other => {
                warn!(%user, kind = %other.kind(), "resolved a non-standby request during activation");
                return Err(ActivateError::ConflictingKind(other.kind()));
            }
        };

        if recorded != chat {
            warn!(%user, expected = %recorded, got = %chat, "chat mismatch on session activation");
            return Err(ActivateError::ChatMismatch {
                expected: recorded,
                got: chat,
            });
        }

        match self.sessions.entry(chat) {
            Entry::Occupied(occupied) => Err(ActivateError::AlreadyActive {
                existing: Arc::clone(occupied.get()),
            }),
            Entry::Vacant(vacant) => {
                let session = Arc::new(Session::new(chat, topic, workflow, publisher));
                vacant.insert(Arc::clone(&session));
                info!(
                    session = %session.id(),
                    %chat,
                    %user,
                    topic = session.topic(),
                    is_new,
                    "session activated"
                );
                Ok(session)
            }
        }
    }

    /// Atomically remove and return the session for `chat`.
    pub fn deactivate(&self, chat: ChatId) -> Option<Arc<Session>> {
        let (_, session) = self.sessions.remove(&chat)?;
        info!(session = %session.id(), %chat, "session deactivated");
        Some(session)
    }

    /// Non-mutating lookup of the session for `chat`.
    pub fn get(&self, chat: ChatId) -> Option<Arc<Session>> {
        // Clone out of the map immediately; never hold a DashMap guard
        // past the return.
        self.sessions.get(&chat).map(|s| Arc::clone(s.value()))
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no sessions are live.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for ActiveSessions {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ActiveSessions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveSessions")
            .field("active", &self.sessions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use std::time::Duration;

    const LONG: Duration = Duration::from_secs(300);

    #[tokio::test]
    async fn activation_consumes_the_standby_request() {
        let pending = PendingRequests::new();
        let sessions = ActiveSessions::new();
        let workflow = testutil::workflow("notes");

        assert!(
            pending
                .mark_standby(
                    Arc::clone(&workflow),
                    UserId(42),
                    ChatId(100),
                    "standup",
                    true,
                    LONG,
                )
                .inserted()
        );
        let request = pending.standby(UserId(42)).unwrap();
        match request.payload() {
            Payload::Standby { topic, is_new, .. } => {
                assert_eq!(topic, "standup");
                assert!(is_new);
            }
            other => panic!("unexpected payload: {other:?}"),
        }

        let session = sessions
            .activate(
                &pending,
                workflow,
                UserId(42),
                ChatId(100),
                testutil::publisher(),
            )
            .unwrap();
        assert_eq!(session.topic(), "standup");

        assert!(sessions.get(ChatId(100)).is_some());
        assert!(pending.standby(UserId(42)).is_none());
    }

    #[tokio::test]
    async fn chat_mismatch_fails_closed() {
        let pending = PendingRequests::new();
        let sessions = ActiveSessions::new();
        let workflow = testutil::workflow("notes");

        let _ = pending.mark_standby(
            Arc::clone(&workflow),
            UserId(42),
            ChatId(100),
            "standup",
            true,
            LONG,
        );

        let result = sessions.activate(
            &pending,
            workflow,
            UserId(42),
            ChatId(101),
            testutil::publisher(),
        );
        assert!(matches!(
            result,
            Err(ActivateError::ChatMismatch {
                expected: ChatId(100),
                got: ChatId(101),
            })
        ));

        // No session was installed, and the request is gone for good.
        assert!(sessions.get(ChatId(101)).is_none());
        assert!(pending.standby(UserId(42)).is_none());
    }

    #[tokio::test]
    async fn activation_without_request_fails() {
        let pending = PendingRequests::new();
        let sessions = ActiveSessions::new();

        let result = sessions.activate(
            &pending,
            testutil::workflow("notes"),
            UserId(42),
            ChatId(100),
            testutil::publisher(),
        );
        assert!(matches!(result, Err(ActivateError::RequestNotFound(UserId(42)))));
    }

    #[tokio::test]
    async fn non_standby_request_is_a_conflict() {
        let pending = PendingRequests::new();
        let sessions = ActiveSessions::new();
        let workflow = testutil::workflow("notes");

        let _ = pending.mark_editing(Arc::clone(&workflow), UserId(42), LONG);

        let result = sessions.activate(
            &pending,
            workflow,
            UserId(42),
            ChatId(100),
            testutil::publisher(),
        );
        assert!(matches!(
            result,
            Err(ActivateError::ConflictingKind(RequestKind::Editing))
        ));
    }

    #[tokio::test]
    async fn second_activation_returns_the_existing_session() {
        let pending = PendingRequests::new();
        let sessions = ActiveSessions::new();
        let workflow = testutil::workflow("notes");

        let _ = pending.mark_standby(
            Arc::clone(&workflow),
            UserId(1),
            ChatId(100),
            "a",
            true,
            LONG,
        );
        let first = sessions
            .activate(
                &pending,
                Arc::clone(&workflow),
                UserId(1),
                ChatId(100),
                testutil::publisher(),
            )
            .unwrap();

        // A second user races an activation for the same chat.
        let _ = pending.mark_standby(
            Arc::clone(&workflow),
            UserId(2),
            ChatId(100),
            "b",
            true,
            LONG,
        );
        let result = sessions.activate(
            &pending,
            workflow,
            UserId(2),
            ChatId(100),
            testutil::publisher(),
        );
        match result {
            Err(ActivateError::AlreadyActive { existing }) => {
                assert_eq!(existing.id(), first.id());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn deactivation_is_exactly_once() {
        let pending = PendingRequests::new();
        let sessions = ActiveSessions::new();
        let workflow = testutil::workflow("notes");

        let _ = pending.mark_standby(
            Arc::clone(&workflow),
            UserId(42),
            ChatId(100),
            "standup",
            true,
            LONG,
        );
        let _ = sessions
            .activate(
                &pending,
                workflow,
                UserId(42),
                ChatId(100),
                testutil::publisher(),
            )
            .unwrap();

        assert!(sessions.deactivate(ChatId(100)).is_some());
        assert!(sessions.get(ChatId(100)).is_none());
        assert!(sessions.deactivate(ChatId(100)).is_none());
    }
}
