//! Generator output and publisher result types.

use serde::{Deserialize, Serialize};

/// A publishable document produced by a content generator.
///
/// The body is renderer-specific markup -- the engine never inspects it,
/// it only carries the document from the generator to the caller, who
/// hands it to the session's publisher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub body: String,
}

/// Where a published document ended up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedPage {
    /// Public URL of the published document.
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_serde() {
        let doc = Document {
            title: "Standup notes".to_string(),
            body: "<p>hello</p>".to_string(),
        };
        let json = serde_json::to_string(&doc).unwrap();
        let parsed: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, doc);
    }
}
