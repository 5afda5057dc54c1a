//! Shared fixtures for the crate's tests: a workflow wired with inert
//! collaborators.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use gazette_types::document::{Document, PublishedPage};
use gazette_types::error::{EnrichError, GenerateError, PublishError};

use crate::enrich::{MediaStore, WebArchiver};
use crate::generator::{BoxGenerator, Generator};
use crate::message::Message;
use crate::publisher::{BoxPublisher, Publisher, PublisherFactory};
use crate::workflow::{CommandNames, Workflow};

/// Titles documents with the service name and message count so tests can
/// assert on what reached the generator.
struct CountingGenerator {
    service: String,
}

impl Generator for CountingGenerator {
    async fn generate(&self, messages: &[Arc<Message>]) -> Result<Document, GenerateError> {
        Ok(Document {
            title: format!("{}: {} messages", self.service, messages.len()),
            body: String::new(),
        })
    }
}

/// Publishes nowhere and reports a fixed URL.
struct NullPublisher;

impl Publisher for NullPublisher {
    fn target(&self) -> &str {
        "null"
    }

    async fn publish(&self, _document: &Document) -> Result<PublishedPage, PublishError> {
        Ok(PublishedPage {
            url: "https://pages.invalid/null".to_string(),
        })
    }
}

struct NullPublisherFactory;

impl PublisherFactory for NullPublisherFactory {
    fn create<'a>(&'a self, _author: &'a str) -> BoxFuture<'a, Result<BoxPublisher, PublishError>> {
        Box::pin(async { Ok(BoxPublisher::new(NullPublisher)) })
    }
}

struct NullMediaStore;

impl MediaStore for NullMediaStore {
    fn upload<'a>(
        &'a self,
        name: &'a str,
        _bytes: Vec<u8>,
    ) -> BoxFuture<'a, Result<String, EnrichError>> {
        Box::pin(async move { Ok(format!("https://cdn.invalid/{name}")) })
    }
}

struct NullArchiver;

impl WebArchiver for NullArchiver {
    fn archive<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, EnrichError>> {
        Box::pin(async move { Ok(format!("https://archive.invalid/{url}")) })
    }
}

/// A workflow named `service` with inert collaborators.
pub(crate) fn workflow(service: &str) -> Arc<Workflow> {
    Arc::new(Workflow::new(
        service,
        BoxGenerator::new(CountingGenerator {
            service: service.to_string(),
        }),
        Arc::new(NullPublisherFactory),
        Arc::new(NullMediaStore),
        Arc::new(NullArchiver),
        CommandNames::default(),
    ))
}

/// A publisher handle targeting nowhere.
pub(crate) fn publisher() -> BoxPublisher {
    BoxPublisher::new(NullPublisher)
}
