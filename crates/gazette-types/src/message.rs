//! Flags carried by a curated message.

use serde::{Deserialize, Serialize};

/// Delivery flags recorded when a chat message arrives.
///
/// The generator uses these to decide how (or whether) to render a
/// message; the lifecycle engine only stores them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFlags {
    /// Sent in a private exchange with the bot rather than the group chat.
    pub private: bool,
    /// Forwarded from another chat.
    pub forwarded: bool,
    /// A reply to an earlier message.
    pub reply: bool,
}
