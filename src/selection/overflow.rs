use tracing::warn;

use crate::document::Document;
use crate::selection::tokens::TokenEstimator;
use crate::types::decision::OverflowCheck;

/// Total the token cost of a candidate set (plus requirements overhead)
/// and compare it against the budget.
///
/// Malformed documents (missing id or content) contribute zero tokens and
/// are skipped without aborting the batch. A non-positive budget always
/// overflows: no content can fit in it, by definition.
pub fn check_overflow<T: TokenEstimator>(
    documents: &[Document],
    max_tokens: i64,
    requirements_text: &str,
    estimator: &T,
) -> OverflowCheck {
    let mut current_tokens = estimator.estimate(requirements_text);

    for (index, doc) in documents.iter().enumerate() {
        if !doc.is_well_formed() {
            warn!(index, "skipping malformed document in overflow check");
            continue;
        }
        current_tokens += estimator.estimate_opt(doc.content.as_deref());
    }

    let would_overflow = max_tokens <= 0 || current_tokens as i64 > max_tokens;
    let overflow_amount = (current_tokens as i64 - max_tokens).max(0) as usize;

    OverflowCheck {
        would_overflow,
        current_tokens,
        overflow_amount,
    }
}
