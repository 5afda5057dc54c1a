//! Publisher port, its type-erased wrapper, and the per-session factory.
//!
//! The engine never publishes anything itself: it stores a
//! [`BoxPublisher`] in each session and hands it back to the caller, who
//! invokes it after content generation. The factory mints one handle per
//! session (publishing targets are typically per-document accounts or
//! per-session pages).

use std::future::Future;
use std::pin::Pin;

use futures_util::future::BoxFuture;
use gazette_types::document::{Document, PublishedPage};
use gazette_types::error::PublishError;

/// Pushes a generated document to its publishing target.
pub trait Publisher: Send + Sync {
    /// Human-readable name of the publishing target (for logs).
    fn target(&self) -> &str;

    /// Publish `document`, returning where it landed.
    fn publish(
        &self,
        document: &Document,
    ) -> impl Future<Output = Result<PublishedPage, PublishError>> + Send;
}

/// Object-safe version of [`Publisher`] with a boxed future.
trait PublisherDyn: Send + Sync {
    fn target(&self) -> &str;

    fn publish_boxed<'a>(
        &'a self,
        document: &'a Document,
    ) -> Pin<Box<dyn Future<Output = Result<PublishedPage, PublishError>> + Send + 'a>>;
}

impl<T: Publisher> PublisherDyn for T {
    fn target(&self) -> &str {
        Publisher::target(self)
    }

    fn publish_boxed<'a>(
        &'a self,
        document: &'a Document,
    ) -> Pin<Box<dyn Future<Output = Result<PublishedPage, PublishError>> + Send + 'a>> {
        Box::pin(self.publish(document))
    }
}

/// Type-erased publisher handle stored in a session.
pub struct BoxPublisher {
    inner: Box<dyn PublisherDyn>,
}

impl BoxPublisher {
    /// Wrap a concrete [`Publisher`] in a type-erased box.
    pub fn new<T: Publisher + 'static>(publisher: T) -> Self {
        Self {
            inner: Box::new(publisher),
        }
    }

    /// Human-readable name of the publishing target.
    pub fn target(&self) -> &str {
        self.inner.target()
    }

    /// Publish `document`, returning where it landed.
    pub async fn publish(&self, document: &Document) -> Result<PublishedPage, PublishError> {
        self.inner.publish_boxed(document).await
    }
}

impl std::fmt::Debug for BoxPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxPublisher")
            .field("target", &self.target())
            .finish()
    }
}

/// Mints a publisher handle for a new session.
///
/// Object-safe by construction (boxed future) so a workflow can carry the
/// factory as `Arc<dyn PublisherFactory>`.
pub trait PublisherFactory: Send + Sync {
    /// Create a publisher handle attributed to `author`.
    fn create<'a>(&'a self, author: &'a str) -> BoxFuture<'a, Result<BoxPublisher, PublishError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder;

    impl Publisher for Recorder {
        fn target(&self) -> &str {
            "recorder"
        }

        async fn publish(&self, document: &Document) -> Result<PublishedPage, PublishError> {
            Ok(PublishedPage {
                url: format!("https://pages.invalid/{}", document.title),
            })
        }
    }

    #[tokio::test]
    async fn box_publisher_delegates() {
        let publisher = BoxPublisher::new(Recorder);
        assert_eq!(publisher.target(), "recorder");

        let page = publisher
            .publish(&Document {
                title: "notes".to_string(),
                body: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(page.url, "https://pages.invalid/notes");
    }

    #[test]
    fn debug_shows_target() {
        let publisher = BoxPublisher::new(Recorder);
        assert!(format!("{publisher:?}").contains("recorder"));
    }
}
