//! Active sessions: the per-chat accumulation aggregate.
//!
//! A session owns the ordered list of messages captured between session
//! start and end, the publisher handle minted for it, and the workflow it
//! belongs to. [`registry`] holds the per-chat map and the activation
//! handshake that consumes a pending request.

pub mod registry;

pub use registry::{ActivateError, ActiveSessions};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gazette_types::identity::{ChatId, MessageId};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::message::Message;
use crate::publisher::BoxPublisher;
use crate::workflow::Workflow;

/// A live accumulation session for one chat.
///
/// The message list is guarded by a mutex, but the engine assumes the
/// platform adapter delivers events for a single chat serially, so the
/// lock is uncontended in practice; it exists so a misbehaving adapter
/// degrades to blocking instead of undefined behavior. Sessions hold a
/// small, bounded number of messages between start and end, so the
/// linear-scan operations below are an accepted trade-off.
pub struct Session {
    id: Uuid,
    chat: ChatId,
    topic: String,
    workflow: Arc<Workflow>,
    publisher: BoxPublisher,
    started_at: DateTime<Utc>,
    messages: Mutex<Vec<Arc<Message>>>,
}

impl Session {
    pub(crate) fn new(
        chat: ChatId,
        topic: String,
        workflow: Arc<Workflow>,
        publisher: BoxPublisher,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            chat,
            topic,
            workflow,
            publisher,
            started_at: Utc::now(),
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Internal session id (log correlation only).
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The chat this session accumulates from.
    pub fn chat(&self) -> ChatId {
        self.chat
    }

    /// Topic given at session start (or the resume key for resumed
    /// sessions).
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// The workflow this session belongs to.
    pub fn workflow(&self) -> &Arc<Workflow> {
        &self.workflow
    }

    /// The publisher handle minted for this session. The engine only
    /// stores it; the caller publishes.
    pub fn publisher(&self) -> &BoxPublisher {
        &self.publisher
    }

    /// When the session was activated.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Append a captured message. Called as chat messages arrive while
    /// the session is active.
    pub fn append(&self, message: Arc<Message>) {
        self.messages.lock().push(message);
    }

    /// Remove the message with the given id, if present, releasing its
    /// resources. Linear scan.
    pub fn delete(&self, id: MessageId) -> bool {
        let mut messages = self.messages.lock();
        match messages.iter().position(|m| m.id() == id) {
            Some(index) => {
                let removed = messages.remove(index);
                removed.dispose();
                true
            }
            None => false,
        }
    }

    /// Drop the first `n` messages, releasing their resources.
    ///
    /// Used after a successful publish to discard already-rendered
    /// messages while keeping anything appended afterward (platform
    /// redelivery can append during the publish).
    pub fn truncate(&self, n: usize) {
        let mut messages = self.messages.lock();
        let n = n.min(messages.len());
        for message in messages.drain(..n) {
            message.dispose();
        }
    }

    /// Cloned snapshot of the current message list. No guard outlives the
    /// call.
    pub fn messages(&self) -> Vec<Arc<Message>> {
        self.messages.lock().clone()
    }

    /// Number of accumulated messages.
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    /// Whether no messages have accumulated.
    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("chat", &self.chat)
            .field("topic", &self.topic)
            .field("messages", &self.messages.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use gazette_types::message::MessageFlags;
    use gazette_types::span::Span;

    fn session() -> Session {
        Session::new(
            ChatId(100),
            "standup".to_string(),
            testutil::workflow("notes"),
            testutil::publisher(),
        )
    }

    fn message(id: i64) -> Arc<Message> {
        Message::new(
            MessageId(id),
            MessageFlags::default(),
            vec![Span::text(format!("msg {id}"))],
        )
    }

    #[test]
    fn append_preserves_order() {
        let session = session();
        session.append(message(1));
        session.append(message(2));
        session.append(message(3));

        let ids: Vec<_> = session.messages().iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec![MessageId(1), MessageId(2), MessageId(3)]);
    }

    #[test]
    fn delete_removes_by_id() {
        let session = session();
        session.append(message(1));
        session.append(message(2));

        assert!(session.delete(MessageId(1)));
        assert!(!session.delete(MessageId(1)));
        assert_eq!(session.len(), 1);
        assert_eq!(session.messages()[0].id(), MessageId(2));
    }

    #[test]
    fn truncate_drops_prefix_only() {
        let session = session();
        for id in 1..=4 {
            session.append(message(id));
        }

        session.truncate(3);
        let ids: Vec<_> = session.messages().iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec![MessageId(4)]);
    }

    #[test]
    fn truncate_past_end_empties_the_list() {
        let session = session();
        session.append(message(1));
        session.truncate(10);
        assert!(session.is_empty());
    }

    #[test]
    fn truncated_messages_are_disposed() {
        let session = session();
        let msg = message(1);
        session.append(Arc::clone(&msg));
        assert_eq!(msg.spans().len(), 1);

        session.truncate(1);
        assert!(msg.spans().is_empty());
    }

    #[test]
    fn accessors() {
        let session = session();
        assert_eq!(session.chat(), ChatId(100));
        assert_eq!(session.topic(), "standup");
        assert_eq!(session.workflow().name(), "notes");
        assert_eq!(session.publisher().target(), "null");
    }
}
