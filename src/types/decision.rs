use serde::{Deserialize, Serialize};

/// A fully qualified, normalized requirements query.
/// Normalization rules:
/// - Lowercase
/// - Split on whitespace
/// - Leading/trailing punctuation stripped from each term
/// - Empty terms dropped
#[derive(Debug, Clone)]
pub struct Query {
    pub raw: String,
    pub terms: Vec<String>,
}

impl Query {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let terms = raw
            .to_lowercase()
            .split_whitespace()
            .map(|s| s.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self { raw, terms }
    }

    /// Membership test used by the match factors.
    pub fn contains_term(&self, term: &str) -> bool {
        self.terms.iter().any(|t| t == term)
    }
}

/// Outcome of comparing a document set against a token budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverflowCheck {
    pub would_overflow: bool,
    pub current_tokens: usize,
    pub overflow_amount: usize,
}

/// A single budget-fitting document, annotated for the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub document_id: String,
    pub relevance_score: f64,
    pub tokens: usize,
}

/// The final result of a recommendation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub recommendations: Vec<Recommendation>,
    pub total_tokens: usize,
    pub documents_considered: usize,
    pub documents_skipped: usize,
    pub documents_excluded_by_strictness: usize,
    pub documents_excluded_by_budget: usize,
}

/// Per-factor raw values, each in [0,1], kept so a score stays explainable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDetails {
    pub type_priority: f64,
    pub keyword_relevance: f64,
    pub agency_match: f64,
    pub technology_match: f64,
    pub recency: f64,
}

/// Internal: a document that has been scored and tokenized but not yet
/// selected. Holds a reference to the original document to avoid cloning
/// content prematurely; `index` is the document's original list position,
/// used as the deterministic tie-breaker.
#[derive(Debug, Clone)]
pub struct ScoredCandidate<'a> {
    pub document: &'a crate::document::Document,
    pub index: usize,

    pub score: f64,
    pub score_details: ScoreDetails,

    pub token_count: usize,
}

/// Malformed top-level request. Rejected before any processing.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Field {field} is invalid: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },
}
