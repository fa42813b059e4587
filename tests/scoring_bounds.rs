use chrono::{Duration, TimeZone, Utc};
use context_budget::config::{EngineConfig, ScoringWeights};
use context_budget::document::{Document, DocumentMetadata, DocumentType};
use context_budget::selection::{Scorer, WeightedScorer};
use context_budget::types::Query;

fn default_scorer() -> WeightedScorer {
    let config = EngineConfig::default();
    let now = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
    WeightedScorer::new(config.weights, config.document_types_priority, now)
}

fn score(scorer: &WeightedScorer, doc: &Document, requirements: &str) -> f64 {
    let query = Query::new(requirements);
    let details = scorer.score(doc, &query);
    scorer.score_value(&details)
}

#[test]
fn invariant_score_bounded() {
    let scorer = default_scorer();
    let now = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();

    let docs = vec![
        Document::new("plain", DocumentType::Reference, "plain text"),
        Document::new("sol", DocumentType::Solicitation, "solicitation body").with_metadata(
            DocumentMetadata::new()
                .with_agency("Department of Energy")
                .with_keywords(["cloud", "migration", "security"])
                .with_technologies(["kubernetes", "terraform"])
                .with_date(now - Duration::days(10)),
        ),
        Document {
            id: Some("bare".into()),
            doc_type: None,
            content: Some(String::new()),
            metadata: DocumentMetadata::default(),
        },
    ];

    for doc in &docs {
        for requirements in [
            "",
            "cloud migration for the Department of Energy using kubernetes",
            "completely unrelated text about gardening",
        ] {
            let s = score(&scorer, doc, requirements);
            assert!((0.0..=100.0).contains(&s), "score {s} out of range for {:?}", doc.id);
        }
    }
}

#[test]
fn keyword_overlap_raises_score() {
    let scorer = default_scorer();
    let requirements = "cloud migration security assessment";

    let matching = Document::new("m", DocumentType::Reference, "body")
        .with_metadata(DocumentMetadata::new().with_keywords(["cloud", "security"]));
    let unrelated = Document::new("u", DocumentType::Reference, "body")
        .with_metadata(DocumentMetadata::new().with_keywords(["submarine", "catering"]));

    assert!(score(&scorer, &matching, requirements) > score(&scorer, &unrelated, requirements));
}

#[test]
fn agency_full_match_beats_partial_beats_none() {
    let scorer = default_scorer();
    let requirements = "Modernization effort for the Department of Energy data centers";

    let full = Document::new("f", DocumentType::Reference, "body")
        .with_metadata(DocumentMetadata::new().with_agency("Department of Energy"));
    let partial = Document::new("p", DocumentType::Reference, "body")
        .with_metadata(DocumentMetadata::new().with_agency("Energy Research Council"));
    let none = Document::new("n", DocumentType::Reference, "body")
        .with_metadata(DocumentMetadata::new().with_agency("Bureau of Fisheries"));

    let full_score = score(&scorer, &full, requirements);
    let partial_score = score(&scorer, &partial, requirements);
    let none_score = score(&scorer, &none, requirements);

    assert!(full_score > partial_score, "{full_score} vs {partial_score}");
    assert!(partial_score > none_score, "{partial_score} vs {none_score}");
}

#[test]
fn technology_overlap_raises_score() {
    let scorer = default_scorer();
    let requirements = "implement services on kubernetes with terraform pipelines";

    let matching = Document::new("m", DocumentType::Reference, "body")
        .with_metadata(DocumentMetadata::new().with_technologies(["kubernetes", "terraform"]));
    let empty = Document::new("e", DocumentType::Reference, "body");

    assert!(score(&scorer, &matching, requirements) > score(&scorer, &empty, requirements));
}

#[test]
fn recent_documents_outscore_stale_ones() {
    let scorer = default_scorer();
    let now = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();

    let fresh = Document::new("fresh", DocumentType::Reference, "body")
        .with_metadata(DocumentMetadata::new().with_date(now - Duration::days(5)));
    let stale = Document::new("stale", DocumentType::Reference, "body")
        .with_metadata(DocumentMetadata::new().with_date(now - Duration::days(2_000)));

    assert!(score(&scorer, &fresh, "req") > score(&scorer, &stale, "req"));
}

#[test]
fn missing_date_is_neutral_not_penalized() {
    let scorer = default_scorer();
    let now = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();

    let undated = Document::new("undated", DocumentType::Reference, "body");
    let ancient = Document::new("ancient", DocumentType::Reference, "body")
        .with_metadata(DocumentMetadata::new().with_date(now - Duration::days(10_000)));

    // Neutral must sit strictly above a deeply stale date.
    assert!(score(&scorer, &undated, "req") > score(&scorer, &ancient, "req"));
}

#[test]
fn type_priority_orders_the_baseline() {
    let scorer = default_scorer();

    let solicitation = Document::new("s", DocumentType::Solicitation, "body");
    let media = Document::new("m", DocumentType::Media, "body");

    assert!(score(&scorer, &solicitation, "req") > score(&scorer, &media, "req"));
}

#[test]
fn higher_weight_means_larger_contribution() {
    let config = EngineConfig::default();
    let now = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
    let requirements = "kubernetes deployment";

    let doc = Document::new("d", DocumentType::Reference, "body")
        .with_metadata(DocumentMetadata::new().with_technologies(["kubernetes"]));

    let mut low = ScoringWeights::default();
    low.set("technology_match", 1.0);
    let mut high = ScoringWeights::default();
    high.set("technology_match", 10.0);

    let low_scorer = WeightedScorer::new(low, config.document_types_priority.clone(), now);
    let high_scorer = WeightedScorer::new(high, config.document_types_priority, now);

    let query = Query::new(requirements);
    let low_score = low_scorer.score_value(&low_scorer.score(&doc, &query));
    let high_score = high_scorer.score_value(&high_scorer.score(&doc, &query));

    assert!(high_score > low_score, "{high_score} vs {low_score}");
}

#[test]
fn scoring_is_pure_and_repeatable() {
    let scorer = default_scorer();
    let doc = Document::new("d", DocumentType::Requirements, "body")
        .with_metadata(DocumentMetadata::new().with_keywords(["alpha", "beta"]));

    let a = score(&scorer, &doc, "alpha requirements");
    let b = score(&scorer, &doc, "alpha requirements");
    assert_eq!(a, b);
}
