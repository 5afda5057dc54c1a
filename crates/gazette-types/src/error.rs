use thiserror::Error;

/// Errors raised by a content generator.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("nothing to render: session has no messages")]
    Empty,

    #[error("content generation cancelled")]
    Cancelled,

    #[error("render failed: {0}")]
    Render(String),
}

/// Errors raised by a publisher or publisher factory.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publisher rejected the document: {0}")]
    Rejected(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("rate limited, retry after {0}s")]
    RateLimited(u64),
}

/// Errors raised by enrichment collaborators (media upload, link archive).
///
/// Enrichment failures never block a session: they are collected on the
/// message they belong to and surfaced to the user best-effort after the
/// fact.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("archive service unavailable")]
    ArchiveUnavailable,

    #[error("unsupported media: {0}")]
    Unsupported(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_error_display() {
        let err = GenerateError::Render("missing template".to_string());
        assert_eq!(err.to_string(), "render failed: missing template");
    }

    #[test]
    fn test_publish_error_display() {
        let err = PublishError::RateLimited(30);
        assert_eq!(err.to_string(), "rate limited, retry after 30s");
    }

    #[test]
    fn test_enrich_error_display() {
        let err = EnrichError::Upload("413 payload too large".to_string());
        assert!(err.to_string().contains("413"));
    }
}
