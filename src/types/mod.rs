pub mod decision;
pub mod identifiers;

pub use decision::{
    OverflowCheck, Query, Recommendation, RecommendationResult, ScoreDetails, ScoredCandidate,
    ValidationError,
};
pub use identifiers::{DocumentId, EventId, ProjectId};
