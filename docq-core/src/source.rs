//! Provenance records attached to generated answers.

use serde::{Deserialize, Serialize};

use crate::document::DocumentId;

/// A provenance record pointing back at the evidence behind an answer.
///
/// Invariant: an answer carries at most one `Document` source per distinct
/// document, even when several chunks of that document contributed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Source {
    /// Evidence from an uploaded document. Carries a document reference
    /// rather than raw text so callers can deduplicate and link back.
    Document {
        /// The contributing document.
        document_id: DocumentId,
        /// Display title (the uploaded filename).
        title: String,
    },
    /// Evidence from a web search result.
    Web {
        /// Result title as reported by the provider.
        title: String,
        /// Result URL.
        url: String,
    },
    /// An extracted page image (populated by presentation-layer collaborators).
    Image {
        /// One-based page number the image was taken from.
        page: usize,
        /// Raw image bytes.
        data: Vec<u8>,
    },
}

impl Source {
    /// The document id, when this is a document-kind source.
    pub fn document_id(&self) -> Option<DocumentId> {
        match self {
            Source::Document { document_id, .. } => Some(*document_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_kind_tag() {
        let source = Source::Web { title: "Paris".into(), url: "https://example.org".into() };
        let json = serde_json::to_value(&source).unwrap();
        assert_eq!(json["kind"], "web");
        assert_eq!(json["url"], "https://example.org");
    }
}
