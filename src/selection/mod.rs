pub mod budgeting;
pub mod filters;
pub mod overflow;
pub mod scoring;
pub mod tokens;

use std::cmp::Ordering;

use tracing::warn;

use crate::document::Document;
use crate::types::decision::{Query, RecommendationResult, ScoredCandidate};
pub use budgeting::{apply_budget, BudgetResult};
pub use overflow::check_overflow;
pub use scoring::{Scorer, WeightedScorer};
pub use tokens::{ApproxTokenEstimator, TokenEstimator};

pub struct RecommendationEngine<S, T> {
	scorer: S,
	estimator: T,
}

impl<S, T> RecommendationEngine<S, T>
where
	S: Scorer,
	T: TokenEstimator,
{
	pub fn new(scorer: S, estimator: T) -> Self {
		Self { scorer, estimator }
	}

	/// Select a maximal-relevance subset of `documents` that fits
	/// `max_tokens`, at whole-document granularity.
	///
	/// Malformed documents are skipped (and counted), never fatal. The
	/// returned total never exceeds the budget; a non-positive budget
	/// yields an empty selection.
	pub fn recommend(
		&self,
		documents: &[Document],
		max_tokens: i64,
		query: &Query,
		strictness: u8,
	) -> RecommendationResult {
		// 1. Scoring Phase
		// Malformed entries are logged and excluded; the rest of the
		// batch is still processed.
		let mut documents_skipped = 0;
		let mut candidates: Vec<ScoredCandidate> = Vec::with_capacity(documents.len());
		for (index, doc) in documents.iter().enumerate() {
			if !doc.is_well_formed() {
				warn!(index, "skipping malformed document in recommendation");
				documents_skipped += 1;
				continue;
			}

			let details = self.scorer.score(doc, query);
			let score = self.scorer.score_value(&details);
			let token_count = self.estimator.estimate_opt(doc.content.as_deref());
			candidates.push(ScoredCandidate {
				document: doc,
				index,
				score,
				score_details: details,
				token_count,
			});
		}

		// 2. Ordering Phase
		// Sort globally by (score desc, original position asc). The
		// position tie-break is what makes the selection deterministic.
		candidates.sort_by(|a, b| {
			// Descending score
			let score_cmp = b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal);
			if score_cmp != Ordering::Equal {
				score_cmp
			} else {
				// Ascending original position
				a.index.cmp(&b.index)
			}
		});

		debug_assert!(
			candidates.windows(2).all(|w| {
				let a = &w[0];
				let b = &w[1];
				a.score > b.score || (a.score == b.score && a.index <= b.index)
			})
		);

		// 3. Filtering Phase
		let before_filter = candidates.len();
		let candidates = filters::apply_strictness(candidates, strictness);
		let documents_excluded_by_strictness = before_filter - candidates.len();

		// 4. Budgeting Phase
		let BudgetResult {
			selected,
			tokens_used,
			documents_selected: _,
			documents_excluded_by_budget,
		} = apply_budget(candidates, max_tokens);

		RecommendationResult {
			recommendations: selected,
			total_tokens: tokens_used,
			documents_considered: documents.len(),
			documents_skipped,
			documents_excluded_by_strictness,
			documents_excluded_by_budget,
		}
	}
}
