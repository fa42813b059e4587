pub mod document;
pub mod metadata;

pub use crate::types::identifiers::DocumentId;
pub use document::{Document, DocumentType};
pub use metadata::DocumentMetadata;
