use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::document::DocumentType;

/// Names of the scoring factors the bundled scorer consumes.
pub const FACTOR_AGENCY_MATCH: &str = "agency_match";
pub const FACTOR_TECHNOLOGY_MATCH: &str = "technology_match";
pub const FACTOR_RECENCY: &str = "recency";
pub const FACTOR_KEYWORD_RELEVANCE: &str = "keyword_relevance";

/// Factor name → weight, each in [0,10].
///
/// The factor set is extensible: unknown names are stored and
/// range-validated like any other, they just contribute nothing until a
/// scorer reads them. BTree-backed for deterministic iteration and
/// serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoringWeights {
    inner: BTreeMap<String, f64>,
}

impl ScoringWeights {
    pub fn new() -> Self {
        ScoringWeights {
            inner: BTreeMap::new(),
        }
    }

    /// Absent factors weigh nothing.
    pub fn weight(&self, factor: &str) -> f64 {
        self.inner.get(factor).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, factor: impl Into<String>, weight: f64) {
        self.inner.insert(factor.into(), weight);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.inner.iter()
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        let mut weights = ScoringWeights::new();
        weights.set(FACTOR_KEYWORD_RELEVANCE, 8.0);
        weights.set(FACTOR_TECHNOLOGY_MATCH, 7.0);
        weights.set(FACTOR_AGENCY_MATCH, 6.0);
        weights.set(FACTOR_RECENCY, 4.0);
        weights
    }
}

/// How the overall token budget is divided. Percentages must sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSplit {
    pub context: u8,
    pub generation: u8,
    pub buffer: u8,
}

impl AllocationSplit {
    pub fn total(&self) -> u32 {
        self.context as u32 + self.generation as u32 + self.buffer as u32
    }
}

impl Default for AllocationSplit {
    fn default() -> Self {
        AllocationSplit {
            context: 70,
            generation: 20,
            buffer: 10,
        }
    }
}

/// The complete validated configuration snapshot readers observe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Monotonic version, bumped on every successful update or reset.
    pub version: u64,

    pub weights: ScoringWeights,

    /// [0,100]; documents scoring strictly below this are excluded even
    /// without overflow. 0 disables the filter.
    pub rag_strictness: u8,

    pub allocation: AllocationSplit,

    /// Must be a permutation of [`DocumentType::ALL`]. Earlier position
    /// means higher baseline priority in scoring.
    pub document_types_priority: Vec<DocumentType>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            version: 0,
            weights: ScoringWeights::default(),
            rag_strictness: 0,
            allocation: AllocationSplit::default(),
            document_types_priority: vec![
                DocumentType::Solicitation,
                DocumentType::Requirements,
                DocumentType::Compliance,
                DocumentType::PastPerformance,
                DocumentType::Proposal,
                DocumentType::Reference,
                DocumentType::Media,
            ],
        }
    }
}

/// A partial update. `None` fields keep their current value; present fields
/// replace wholesale. Validation runs on the merged result, never on the
/// patch alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigPatch {
    #[serde(default)]
    pub weights: Option<ScoringWeights>,

    #[serde(default)]
    pub rag_strictness: Option<u8>,

    #[serde(default)]
    pub allocation: Option<AllocationSplit>,

    #[serde(default)]
    pub document_types_priority: Option<Vec<DocumentType>>,
}

impl ConfigPatch {
    pub fn is_empty(&self) -> bool {
        self.weights.is_none()
            && self.rag_strictness.is_none()
            && self.allocation.is_none()
            && self.document_types_priority.is_none()
    }
}
