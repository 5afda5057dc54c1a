//! Opaque platform identifiers for users, chats, and messages.
//!
//! The engine never interprets these values; the platform adapter assigns
//! them from whatever the chat platform hands out (numeric IDs in
//! practice). They only need to be comparable and hashable.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Unique identifier of a platform user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Unique identifier of a chat the bot participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

/// Platform-assigned identifier of a single chat message.
///
/// Message IDs are scoped to a chat; the engine never compares IDs across
/// chats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
