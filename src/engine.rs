use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analytics::{AnalyticsRecorder, OverflowEvent, OverflowStats, SystemOverview};
use crate::config::{ConfigError, ConfigHistoryEntry, ConfigPatch, ConfigStore, EngineConfig, ScoringWeights};
use crate::document::Document;
use crate::selection::{
    check_overflow, ApproxTokenEstimator, RecommendationEngine, WeightedScorer,
};
use crate::types::decision::{Query, RecommendationResult, ValidationError};
use crate::types::identifiers::ProjectId;

/// Top-level request for an overflow check. Arrives loosely shaped from
/// external callers, so every field is optional here and validated before
/// any processing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckOverflowRequest {
    #[serde(default)]
    pub project_id: Option<ProjectId>,

    #[serde(default)]
    pub selected_documents: Option<Vec<Document>>,

    #[serde(default)]
    pub requirements_text: Option<String>,

    #[serde(default)]
    pub max_tokens: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverflowCheckResponse {
    pub would_overflow: bool,
    pub current_tokens: usize,
    pub max_tokens: i64,
    pub overflow_amount: usize,

    /// Present only when overflow was detected.
    pub recommendations: Option<RecommendationResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedSelection {
    pub final_selection: Vec<String>,
}

/// The engine's external surface: overflow checks, recommendations,
/// selection recording, configuration, and analytics aggregates.
///
/// Decisions are pure functions of the inputs and a configuration
/// snapshot; the store and the recorder are the only shared state, each
/// safe for concurrent use on its own.
pub struct ContextBudgetEngine {
    config: ConfigStore,
    analytics: AnalyticsRecorder,
    estimator: ApproxTokenEstimator,
}

impl Default for ContextBudgetEngine {
    fn default() -> Self {
        Self::new(ConfigStore::new(), AnalyticsRecorder::new())
    }
}

impl ContextBudgetEngine {
    pub fn new(config: ConfigStore, analytics: AnalyticsRecorder) -> Self {
        ContextBudgetEngine {
            config,
            analytics,
            estimator: ApproxTokenEstimator,
        }
    }

    /// Total the candidate set against the budget; on overflow, attach a
    /// budget-fitting recommendation and record the occurrence.
    pub fn check_overflow(
        &self,
        request: CheckOverflowRequest,
    ) -> Result<OverflowCheckResponse, ValidationError> {
        let project_id = request
            .project_id
            .ok_or(ValidationError::MissingField("project_id"))?;
        let documents = request
            .selected_documents
            .ok_or(ValidationError::MissingField("selected_documents"))?;
        let requirements_text = request
            .requirements_text
            .ok_or(ValidationError::MissingField("requirements_text"))?;
        let max_tokens = request
            .max_tokens
            .ok_or(ValidationError::MissingField("max_tokens"))?;

        let started = Instant::now();
        let check = check_overflow(&documents, max_tokens, &requirements_text, &self.estimator);

        let recommendations = if check.would_overflow {
            let result = self.recommend(&documents, max_tokens, &requirements_text, None);

            let selected_ids = well_formed_ids(&documents);
            let recommended_ids: Vec<String> = result
                .recommendations
                .iter()
                .map(|r| r.document_id.clone())
                .collect();

            let event = OverflowEvent::new(
                project_id,
                Utc::now(),
                check.current_tokens,
                max_tokens,
                selected_ids,
                recommended_ids,
                started.elapsed().as_millis() as u64,
                false,
            );
            self.analytics.record_overflow(event);

            Some(result)
        } else {
            None
        };

        self.analytics.record_decision_latency(started.elapsed());

        Ok(OverflowCheckResponse {
            would_overflow: check.would_overflow,
            current_tokens: check.current_tokens,
            max_tokens,
            overflow_amount: check.overflow_amount,
            recommendations,
        })
    }

    /// Rank and greedily select a budget-fitting subset. `weights`
    /// overrides the stored scoring weights for this call only.
    pub fn get_recommendations(
        &self,
        documents: &[Document],
        requirements_text: &str,
        max_tokens: i64,
        weights: Option<ScoringWeights>,
    ) -> Result<RecommendationResult, ValidationError> {
        if let Some(weights) = &weights {
            for (factor, weight) in weights.iter() {
                if !weight.is_finite() || !(0.0..=10.0).contains(weight) {
                    return Err(ValidationError::InvalidField {
                        field: "weights",
                        reason: format!("weight for {factor} is {weight}, must be in [0,10]"),
                    });
                }
            }
        }

        let started = Instant::now();
        let result = self.recommend(documents, max_tokens, requirements_text, weights);
        self.analytics.record_decision_latency(started.elapsed());

        Ok(result)
    }

    /// Record the user's final (possibly overriding) document choice.
    pub fn apply_selection(
        &self,
        project_id: &ProjectId,
        selected_documents: &[Document],
        requirements_text: &str,
    ) -> Result<AppliedSelection, ValidationError> {
        if requirements_text.trim().is_empty() {
            return Err(ValidationError::MissingField("requirements_text"));
        }

        let final_selection = well_formed_ids(selected_documents);

        // Accepted means the final choice matches the engine's last
        // recommendation for this project, order aside.
        let accepted = self
            .analytics
            .events()
            .iter()
            .rev()
            .find(|e| &e.project_id == project_id)
            .map(|e| same_id_set(&e.recommended_documents, &final_selection))
            .unwrap_or(false);

        debug!(
            project = project_id.as_str(),
            documents = final_selection.len(),
            accepted,
            "final selection applied"
        );
        self.analytics.record_selection(accepted);

        Ok(AppliedSelection { final_selection })
    }

    pub fn get_config(&self) -> EngineConfig {
        self.config.get()
    }

    pub fn update_config(&self, patch: ConfigPatch, changed_by: &str) -> Result<EngineConfig, ConfigError> {
        self.config.update(patch, changed_by)
    }

    pub fn reset_config(&self, changed_by: &str) -> EngineConfig {
        self.config.reset(changed_by)
    }

    pub fn config_history(&self) -> Vec<ConfigHistoryEntry> {
        self.config.history()
    }

    pub fn get_overflow_stats(&self, project_id: &ProjectId) -> OverflowStats {
        self.analytics.aggregate(project_id)
    }

    pub fn get_dashboard(&self) -> SystemOverview {
        self.analytics.dashboard_snapshot()
    }

    fn recommend(
        &self,
        documents: &[Document],
        max_tokens: i64,
        requirements_text: &str,
        weights: Option<ScoringWeights>,
    ) -> RecommendationResult {
        let config = self.config.get();
        let scorer = WeightedScorer::new(
            weights.unwrap_or(config.weights),
            config.document_types_priority,
            Utc::now(),
        );

        let engine = RecommendationEngine::new(scorer, self.estimator);
        engine.recommend(
            documents,
            max_tokens,
            &Query::new(requirements_text),
            config.rag_strictness,
        )
    }
}

fn well_formed_ids(documents: &[Document]) -> Vec<String> {
    documents
        .iter()
        .filter(|d| d.is_well_formed())
        .filter_map(|d| d.id.as_ref())
        .map(|id| id.as_str().to_string())
        .collect()
}

fn same_id_set(a: &[String], b: &[String]) -> bool {
    use std::collections::BTreeSet;
    let a: BTreeSet<&String> = a.iter().collect();
    let b: BTreeSet<&String> = b.iter().collect();
    a == b
}
