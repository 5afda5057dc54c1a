//! Workflow: the immutable per-service collaborator bundle.
//!
//! A bot typically offers several curation services (standup notes, link
//! digests, ...), each with its own generator, publishing target, and
//! command names. A `Workflow` bundles those collaborators for one
//! service; the engine carries it as read-only context alongside requests
//! and sessions and never mutates it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::enrich::{MediaStore, WebArchiver};
use crate::generator::BoxGenerator;
use crate::publisher::PublisherFactory;

/// Command-name table for one bot service.
///
/// The platform adapter matches incoming command text against these names
/// to pick the operation; the engine itself never parses commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandNames {
    pub new_session: String,
    pub resume_session: String,
    pub edit: String,
    pub list: String,
    pub delete: String,
    pub publish: String,
}

impl Default for CommandNames {
    fn default() -> Self {
        Self {
            new_session: "new".to_string(),
            resume_session: "resume".to_string(),
            edit: "edit".to_string(),
            list: "list".to_string(),
            delete: "delete".to_string(),
            publish: "publish".to_string(),
        }
    }
}

/// Immutable collaborator bundle for one curation service.
pub struct Workflow {
    name: String,
    generator: BoxGenerator,
    publishers: Arc<dyn PublisherFactory>,
    media: Arc<dyn MediaStore>,
    archiver: Arc<dyn WebArchiver>,
    commands: CommandNames,
}

impl Workflow {
    /// Assemble a workflow from its collaborators.
    pub fn new(
        name: impl Into<String>,
        generator: BoxGenerator,
        publishers: Arc<dyn PublisherFactory>,
        media: Arc<dyn MediaStore>,
        archiver: Arc<dyn WebArchiver>,
        commands: CommandNames,
    ) -> Self {
        Self {
            name: name.into(),
            generator,
            publishers,
            media,
            archiver,
            commands,
        }
    }

    /// Service name (for logs and command routing).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The content generator for this service.
    pub fn generator(&self) -> &BoxGenerator {
        &self.generator
    }

    /// The publisher factory for this service.
    pub fn publishers(&self) -> &Arc<dyn PublisherFactory> {
        &self.publishers
    }

    /// The media upload collaborator.
    pub fn media(&self) -> &Arc<dyn MediaStore> {
        &self.media
    }

    /// The link-archiving collaborator.
    pub fn archiver(&self) -> &Arc<dyn WebArchiver> {
        &self.archiver
    }

    /// The command-name table for this service.
    pub fn commands(&self) -> &CommandNames {
        &self.commands
    }
}

impl std::fmt::Debug for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("name", &self.name)
            .field("commands", &self.commands)
            .finish_non_exhaustive()
    }
}
