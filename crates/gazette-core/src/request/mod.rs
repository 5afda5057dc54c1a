//! Pending requests: per-user intents awaiting a correlated reply.
//!
//! A command like "new session" is a two-step exchange: the bot records
//! the intent, prompts the user, and completes the command when the
//! correlated reply arrives (or evicts the intent on timeout). This
//! module defines the request record; [`registry`] holds the per-user
//! map.

pub mod registry;

pub use registry::{MarkPending, PendingRequests};

use std::fmt;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use gazette_types::identity::{ChatId, MessageId};

use crate::workflow::Workflow;

/// Discriminant for the kinds of pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// A new-session or resume-session command waiting for activation.
    Standby,
    /// An edit command waiting for replacement content.
    Editing,
    /// A list command waiting for a selection.
    Listing,
    /// A delete command waiting for confirmation.
    Deleting,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestKind::Standby => "session standby",
            RequestKind::Editing => "editing",
            RequestKind::Listing => "listing",
            RequestKind::Deleting => "deleting",
        };
        write!(f, "{name}")
    }
}

/// Kind-specific payload of a pending request.
#[derive(Debug, Clone)]
pub enum Payload {
    /// Session start intent. `is_new` distinguishes a brand-new session
    /// (`topic` is the session topic) from a resume (`topic` carries the
    /// resume key).
    Standby {
        chat: ChatId,
        topic: String,
        is_new: bool,
    },
    Editing,
    Listing,
    /// `targets` carries the raw identifiers the user asked to delete.
    Deleting { targets: String },
}

impl Payload {
    /// The discriminant for this payload.
    pub fn kind(&self) -> RequestKind {
        match self {
            Payload::Standby { .. } => RequestKind::Standby,
            Payload::Editing => RequestKind::Editing,
            Payload::Listing => RequestKind::Listing,
            Payload::Deleting { .. } => RequestKind::Deleting,
        }
    }
}

/// A per-user in-flight command awaiting a correlated follow-up reply.
///
/// At most one exists per user at any instant (the registry enforces
/// this). The reply-to message id starts unset; once the bot has sent its
/// prompt the id is set exactly once -- the first writer wins and later
/// writes are rejected.
pub struct PendingRequest {
    workflow: Arc<Workflow>,
    payload: Payload,
    reply_to: OnceLock<MessageId>,
    created_at: DateTime<Utc>,
}

impl PendingRequest {
    pub(crate) fn new(workflow: Arc<Workflow>, payload: Payload) -> Self {
        Self {
            workflow,
            payload,
            reply_to: OnceLock::new(),
            created_at: Utc::now(),
        }
    }

    /// The workflow this request belongs to.
    pub fn workflow(&self) -> &Arc<Workflow> {
        &self.workflow
    }

    /// Kind-specific payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The request's kind discriminant.
    pub fn kind(&self) -> RequestKind {
        self.payload.kind()
    }

    /// When the intent was recorded.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Record the prompt message the user is expected to reply to.
    ///
    /// Set-once: returns whether this call performed the set. A second
    /// call (even with the same id) returns `false` and leaves the
    /// original value in place.
    pub fn expect_input(&self, prompt: MessageId) -> bool {
        self.reply_to.set(prompt).is_ok()
    }

    /// The prompt message id, if one has been recorded.
    pub fn reply_to(&self) -> Option<MessageId> {
        self.reply_to.get().copied()
    }
}

impl fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequest")
            .field("kind", &self.kind())
            .field("reply_to", &self.reply_to())
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    fn standby_request() -> PendingRequest {
        PendingRequest::new(
            testutil::workflow("notes"),
            Payload::Standby {
                chat: ChatId(100),
                topic: "standup".to_string(),
                is_new: true,
            },
        )
    }

    #[test]
    fn test_payload_kind_mapping() {
        assert_eq!(
            Payload::Deleting {
                targets: "1 2".to_string()
            }
            .kind(),
            RequestKind::Deleting
        );
        assert_eq!(Payload::Editing.kind(), RequestKind::Editing);
        assert_eq!(Payload::Listing.kind(), RequestKind::Listing);
    }

    #[test]
    fn test_expect_input_first_writer_wins() {
        let request = standby_request();
        assert_eq!(request.reply_to(), None);

        assert!(request.expect_input(MessageId(10)));
        assert!(!request.expect_input(MessageId(11)));
        assert_eq!(request.reply_to(), Some(MessageId(10)));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(RequestKind::Standby.to_string(), "session standby");
        assert_eq!(RequestKind::Deleting.to_string(), "deleting");
    }
}
