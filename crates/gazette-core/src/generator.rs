//! Content generator port and its type-erased wrapper.
//!
//! `Generator` uses native async fn in traits (RPITIT), so it cannot be a
//! trait object directly. `BoxGenerator` wraps any implementation behind
//! dynamic dispatch so a [`Workflow`](crate::workflow::Workflow) can
//! carry it without being generic over the concrete generator.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use gazette_types::document::Document;
use gazette_types::error::GenerateError;

use crate::message::Message;

/// Renders a finished message list into a publishable document.
///
/// Invoked exactly once per join-barrier pass, after every message in the
/// snapshot has become ready. Implementations live outside this crate.
pub trait Generator: Send + Sync {
    /// Render `messages` into a document.
    fn generate(
        &self,
        messages: &[Arc<Message>],
    ) -> impl Future<Output = Result<Document, GenerateError>> + Send;
}

/// Object-safe version of [`Generator`] with a boxed future.
trait GeneratorDyn: Send + Sync {
    fn generate_boxed<'a>(
        &'a self,
        messages: &'a [Arc<Message>],
    ) -> Pin<Box<dyn Future<Output = Result<Document, GenerateError>> + Send + 'a>>;
}

impl<T: Generator> GeneratorDyn for T {
    fn generate_boxed<'a>(
        &'a self,
        messages: &'a [Arc<Message>],
    ) -> Pin<Box<dyn Future<Output = Result<Document, GenerateError>> + Send + 'a>> {
        Box::pin(self.generate(messages))
    }
}

/// Type-erased content generator.
pub struct BoxGenerator {
    inner: Box<dyn GeneratorDyn>,
}

impl BoxGenerator {
    /// Wrap a concrete [`Generator`] in a type-erased box.
    pub fn new<T: Generator + 'static>(generator: T) -> Self {
        Self {
            inner: Box::new(generator),
        }
    }

    /// Render `messages` into a document.
    pub async fn generate(&self, messages: &[Arc<Message>]) -> Result<Document, GenerateError> {
        self.inner.generate_boxed(messages).await
    }
}

impl std::fmt::Debug for BoxGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxGenerator").finish_non_exhaustive()
    }
}
