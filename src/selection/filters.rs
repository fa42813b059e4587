use crate::types::decision::ScoredCandidate;

/// Drop candidates scoring below the configured strictness threshold.
///
/// Strictness is an integer in [0,100] compared directly against the
/// [0,100] relevance score; 0 disables the filter. Applied before
/// budgeting so low-relevance documents are excluded even when the set
/// would otherwise fit.
pub fn apply_strictness(candidates: Vec<ScoredCandidate<'_>>, strictness: u8) -> Vec<ScoredCandidate<'_>> {
    if strictness == 0 {
        return candidates;
    }

    let threshold = strictness as f64;
    candidates
        .into_iter()
        .filter(|c| c.score >= threshold)
        .collect()
}
