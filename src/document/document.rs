use serde::{Deserialize, Serialize};

use super::metadata::DocumentMetadata;
use crate::types::identifiers::DocumentId;

/// Fixed document taxonomy. Priority among types is configuration
/// (`document_types_priority`), not an intrinsic property of the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    Solicitation,
    Requirements,
    PastPerformance,
    Reference,
    Proposal,
    Compliance,
    Media,
}

impl DocumentType {
    /// Every known type, in declaration order. `document_types_priority`
    /// must be a permutation of exactly this set.
    pub const ALL: [DocumentType; 7] = [
        DocumentType::Solicitation,
        DocumentType::Requirements,
        DocumentType::PastPerformance,
        DocumentType::Reference,
        DocumentType::Proposal,
        DocumentType::Compliance,
        DocumentType::Media,
    ];
}

/// The atomic unit of candidate content.
///
/// Every field except `metadata` is deliberately optional: callers hand us
/// loosely-shaped records from an external store, and a missing field is a
/// designed case, not an accident. A document without an `id` or without
/// `content` is malformed: it is skipped from selection (with a warning)
/// but never aborts the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub id: Option<DocumentId>,

    /// Defaults to [`DocumentType::Reference`] when absent.
    #[serde(default, rename = "type")]
    pub doc_type: Option<DocumentType>,

    /// Treated as empty for token accounting when absent.
    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn new(id: impl Into<DocumentId>, doc_type: DocumentType, content: impl Into<String>) -> Self {
        Document {
            id: Some(id.into()),
            doc_type: Some(doc_type),
            content: Some(content.into()),
            metadata: DocumentMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Well-formed means selectable: both an identity and content to select.
    pub fn is_well_formed(&self) -> bool {
        self.id.is_some() && self.content.is_some()
    }

    pub fn doc_type_or_default(&self) -> DocumentType {
        self.doc_type.unwrap_or(DocumentType::Reference)
    }

    pub fn content_str(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}
