use chrono::{DateTime, Utc};

use crate::config::settings::{
    ScoringWeights, FACTOR_AGENCY_MATCH, FACTOR_KEYWORD_RELEVANCE, FACTOR_RECENCY,
    FACTOR_TECHNOLOGY_MATCH,
};
use crate::document::{Document, DocumentType};
use crate::types::decision::{Query, ScoreDetails};

/// Fixed weight of the type-priority baseline, on the same 0–10 scale as
/// the configured factor weights. Keeps the combination denominator
/// strictly positive even when every configured weight is zero.
const TYPE_PRIORITY_WEIGHT: f64 = 5.0;

/// Half-life of the recency decay, in days.
const RECENCY_HALF_LIFE_DAYS: f64 = 365.0;

/// Recency value for documents without a date: neutral, not a penalty.
const RECENCY_NEUTRAL: f64 = 0.5;

pub trait Scorer {
    fn score(&self, doc: &Document, query: &Query) -> ScoreDetails;

    fn score_value(&self, details: &ScoreDetails) -> f64;
}

/// Weighted multi-factor scorer.
///
/// Each factor produces a raw value in [0,1]; the combined score is the
/// weight-normalized average scaled to [0,100]:
///
/// ```text
/// score = 100 · (Σ wᶠ·rawᶠ + W·type_priority) / (Σ wᶠ + W)
/// ```
///
/// where `W` is the fixed type-priority baseline weight. Bounded by
/// construction, monotone in each factor, and a larger configured weight
/// gives its factor a larger share. Missing or malformed metadata
/// contributes a raw 0 (recency: neutral), never an error.
///
/// The scorer is a pure function of its inputs: it owns a configuration
/// snapshot and an explicit `now`, so identical inputs always produce
/// identical scores and concurrent use needs no coordination.
#[derive(Debug, Clone)]
pub struct WeightedScorer {
    weights: ScoringWeights,
    types_priority: Vec<DocumentType>,
    now: DateTime<Utc>,
}

impl WeightedScorer {
    pub fn new(weights: ScoringWeights, types_priority: Vec<DocumentType>, now: DateTime<Utc>) -> Self {
        Self {
            weights,
            types_priority,
            now,
        }
    }

    /// Baseline from the configured type ranking: first position → 1.0,
    /// last → 1/n. A type absent from the list ranks last.
    fn type_priority(&self, doc_type: DocumentType) -> f64 {
        let n = self.types_priority.len().max(1);
        let position = self
            .types_priority
            .iter()
            .position(|t| *t == doc_type)
            .unwrap_or(n - 1);
        (n - position) as f64 / n as f64
    }

    /// Overlap ratio: matched terms over the document's own term count.
    /// No terms on the document side means nothing to match, raw 0.
    fn overlap<'a>(terms: impl ExactSizeIterator<Item = &'a String>, query: &Query) -> f64 {
        let total = terms.len();
        if total == 0 {
            return 0.0;
        }

        let matched = terms.filter(|t| term_in_query(t.as_str(), query)).count();
        matched as f64 / total as f64
    }

    fn agency_match(&self, agency: Option<&str>, query: &Query) -> f64 {
        let Some(agency) = agency else { return 0.0 };
        let agency_lower = agency.trim().to_lowercase();
        if agency_lower.is_empty() {
            return 0.0;
        }

        if query.raw.to_lowercase().contains(&agency_lower) {
            return 1.0;
        }

        // Partial credit when any significant word of the agency name
        // appears among the requirement terms.
        let partial = agency_lower
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|w| w.len() > 2)
            .any(|w| query.contains_term(w));

        if partial {
            0.5
        } else {
            0.0
        }
    }

    fn recency(&self, date: Option<DateTime<Utc>>) -> f64 {
        let Some(date) = date else {
            return RECENCY_NEUTRAL;
        };

        // Future dates clamp to zero age rather than rewarding them.
        let age_days = (self.now - date).num_days().max(0) as f64;
        0.5_f64.powf(age_days / RECENCY_HALF_LIFE_DAYS)
    }
}

impl Scorer for WeightedScorer {
    fn score(&self, doc: &Document, query: &Query) -> ScoreDetails {
        ScoreDetails {
            type_priority: self.type_priority(doc.doc_type_or_default()),
            keyword_relevance: Self::overlap(doc.metadata.keywords.iter(), query),
            agency_match: self.agency_match(doc.metadata.agency.as_deref(), query),
            technology_match: Self::overlap(doc.metadata.technologies.iter(), query),
            recency: self.recency(doc.metadata.date),
        }
    }

    fn score_value(&self, details: &ScoreDetails) -> f64 {
        let factors = [
            (FACTOR_KEYWORD_RELEVANCE, details.keyword_relevance),
            (FACTOR_AGENCY_MATCH, details.agency_match),
            (FACTOR_TECHNOLOGY_MATCH, details.technology_match),
            (FACTOR_RECENCY, details.recency),
        ];

        let mut numerator = TYPE_PRIORITY_WEIGHT * details.type_priority;
        let mut denominator = TYPE_PRIORITY_WEIGHT;
        for (name, raw) in factors {
            let weight = self.weights.weight(name);
            numerator += weight * raw;
            denominator += weight;
        }

        let score = 100.0 * numerator / denominator;
        debug_assert!((0.0..=100.0).contains(&score), "score {score} out of range [0.0, 100.0]");
        score.clamp(0.0, 100.0)
    }
}

/// A document-side term matches when its normalized form equals a query
/// term; multi-word phrases match on whole-phrase containment in the raw
/// requirements text instead.
fn term_in_query(term: &str, query: &Query) -> bool {
    let normalized = term.trim().to_lowercase();
    if normalized.is_empty() {
        return false;
    }

    if normalized.split_whitespace().count() > 1 {
        return query.raw.to_lowercase().contains(&normalized);
    }

    let single = normalized.trim_matches(|c: char| !c.is_alphanumeric());
    !single.is_empty() && query.contains_term(single)
}
