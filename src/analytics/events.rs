use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::identifiers::{EventId, ProjectId};

/// One overflow occurrence and how it was resolved. Immutable once
/// recorded; the recorder's log is append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverflowEvent {
    pub event_id: EventId,
    pub timestamp: DateTime<Utc>,
    pub project_id: ProjectId,

    pub original_token_count: usize,
    pub max_token_count: i64,
    /// max(0, original − max)
    pub overflow_amount: usize,

    /// The documents the caller had selected when overflow was detected.
    pub documents_selected: Vec<String>,
    /// The budget-fitting subset the engine recommended.
    pub recommended_documents: Vec<String>,

    pub resolution_time_ms: u64,
    pub user_override: bool,
}

impl OverflowEvent {
    /// Build an event, deriving the idempotency id from the identifying
    /// fields. Recording the same occurrence again produces the same id
    /// and is deduplicated by the recorder.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        project_id: ProjectId,
        timestamp: DateTime<Utc>,
        original_token_count: usize,
        max_token_count: i64,
        documents_selected: Vec<String>,
        recommended_documents: Vec<String>,
        resolution_time_ms: u64,
        user_override: bool,
    ) -> Self {
        let overflow_amount = (original_token_count as i64 - max_token_count).max(0) as usize;

        let original_str = original_token_count.to_string();
        let max_str = max_token_count.to_string();
        let timestamp_str = timestamp.to_rfc3339();
        let selected_str = documents_selected.join("\n");

        let event_id = EventId::derive(&[
            project_id.as_str(),
            &timestamp_str,
            &original_str,
            &max_str,
            &selected_str,
        ]);

        OverflowEvent {
            event_id,
            timestamp,
            project_id,
            original_token_count,
            max_token_count,
            overflow_amount,
            documents_selected,
            recommended_documents,
            resolution_time_ms,
            user_override,
        }
    }
}

/// Per-project aggregate of recorded overflow events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverflowStats {
    pub total_overflow_events: usize,
    pub average_resolution_time_ms: f64,
}

/// Cross-project aggregate for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemOverview {
    pub total_overflow_events: usize,
    pub projects_with_overflow: usize,
    pub average_resolution_time_ms: f64,

    pub selections_applied: usize,
    /// Applied selections that matched the recommendation exactly.
    pub recommendation_acceptance_rate: f64,

    /// Mean wall-clock cost of a scoring/selection decision.
    pub average_decision_micros: f64,
}
