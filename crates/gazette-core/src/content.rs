//! Content join barrier: wait for every message, then generate.
//!
//! Ending a session hands its accumulated messages to the content
//! generator, but only after every background enrichment worker has
//! finished. The barrier blocks solely the command context that called
//! it; other chats and users are unaffected.

use gazette_types::document::Document;
use gazette_types::error::GenerateError;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::session::Session;

/// Wait for every message in `session` to become ready, then render the
/// list with the session's generator.
///
/// Operates on a snapshot of the message list taken at entry; messages
/// appended afterward are left for the next pass. Worker failures never
/// fail the join -- a message proceeds to ready with whatever partial
/// data it accumulated, and the errors stay on the message for
/// out-of-band reporting.
///
/// There is no maximum wait: a stuck worker blocks this call until
/// `cancel` fires, which requests best-effort cancellation of the
/// remaining workers and returns [`GenerateError::Cancelled`].
pub async fn generate_content(
    session: &Session,
    cancel: &CancellationToken,
) -> Result<Document, GenerateError> {
    let snapshot = session.messages();
    debug!(
        session = %session.id(),
        messages = snapshot.len(),
        "waiting for enrichment before generation"
    );

    for message in &snapshot {
        if !message.wait(cancel).await {
            debug!(session = %session.id(), message = %message.id(), "join barrier cancelled");
            return Err(GenerateError::Cancelled);
        }
    }

    session.workflow().generator().generate(&snapshot).await
}
