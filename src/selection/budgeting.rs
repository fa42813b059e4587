use crate::types::decision::{Recommendation, ScoredCandidate};

pub struct BudgetResult {
    pub selected: Vec<Recommendation>,
    pub tokens_used: usize,
    pub documents_selected: usize,
    pub documents_excluded_by_budget: usize,
}

/// Greedy, capacity-constrained, whole-document selection.
///
/// Walks candidates in ranked order and includes one only if it still fits
/// the remaining budget. A candidate that does not fit is skipped, not a
/// stopping point: a later, smaller document may still fit.
pub fn apply_budget(candidates: Vec<ScoredCandidate<'_>>, max_tokens: i64) -> BudgetResult {
    // A non-positive budget fits nothing, not even zero-token documents.
    if max_tokens <= 0 {
        return BudgetResult {
            selected: Vec::new(),
            tokens_used: 0,
            documents_selected: 0,
            documents_excluded_by_budget: candidates.len(),
        };
    }
    let budget = max_tokens as usize;

    let mut selected = Vec::new();
    let mut tokens_used: usize = 0;
    let mut documents_selected = 0;
    let mut documents_excluded_by_budget = 0;

    for candidate in candidates {
        // Zero-score documents may still be selected if budget allows.
        if tokens_used + candidate.token_count <= budget {
            let id = match &candidate.document.id {
                Some(id) => id.as_str().to_string(),
                // Malformed candidates are filtered before ranking; a
                // missing id here would be a selection-phase bug.
                None => {
                    debug_assert!(false, "unranked candidate reached budgeting");
                    continue;
                }
            };

            selected.push(Recommendation {
                document_id: id,
                relevance_score: candidate.score,
                tokens: candidate.token_count,
            });
            tokens_used += candidate.token_count;
            documents_selected += 1;
        } else {
            documents_excluded_by_budget += 1;
        }
    }

    BudgetResult {
        selected,
        tokens_used,
        documents_selected,
        documents_excluded_by_budget,
    }
}
