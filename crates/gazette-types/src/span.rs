//! Styled content fragments that make up a curated message.
//!
//! Spans are opaque to the lifecycle engine: enrichment workers fill in
//! the `archived_url` / `uploaded_url` fields in place after a message
//! arrives, and the content generator consumes the finished list. Nothing
//! in the engine inspects span contents beyond that.

use serde::{Deserialize, Serialize};

/// Kind of media referenced by a [`Span::Media`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
    Audio,
    Document,
}

/// A styled fragment of message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Span {
    /// Plain text.
    Text { text: String },
    /// Bold text.
    Bold { text: String },
    /// Italic text.
    Italic { text: String },
    /// Inline code.
    Code { text: String },
    /// Preformatted block with an optional language hint.
    Pre {
        text: String,
        language: Option<String>,
    },
    /// A link, optionally enriched with the URL of an archived copy.
    Link {
        text: String,
        url: String,
        /// Filled in by the web-archive enrichment worker; `None` until
        /// the archive request completes (or if it failed).
        archived_url: Option<String>,
    },
    /// A media attachment, optionally enriched with an uploaded copy.
    Media {
        kind: MediaKind,
        /// Platform-side handle of the attachment (file id, local path).
        source: String,
        /// Filled in by the upload enrichment worker; `None` until the
        /// upload completes (or if it failed).
        uploaded_url: Option<String>,
    },
}

impl Span {
    /// Plain-text span.
    pub fn text(text: impl Into<String>) -> Self {
        Span::Text { text: text.into() }
    }

    /// Link span with no archived copy yet.
    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Span::Link {
            text: text.into(),
            url: url.into(),
            archived_url: None,
        }
    }
}
