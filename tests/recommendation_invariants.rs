use chrono::{TimeZone, Utc};
use context_budget::config::EngineConfig;
use context_budget::document::{Document, DocumentMetadata, DocumentType};
use context_budget::selection::{ApproxTokenEstimator, RecommendationEngine, WeightedScorer};
use context_budget::types::Query;

fn make_doc(id: &str, content: &str) -> Document {
    Document::new(id, DocumentType::Reference, content)
}

fn engine() -> RecommendationEngine<WeightedScorer, ApproxTokenEstimator> {
    let config = EngineConfig::default();
    let now = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
    let scorer = WeightedScorer::new(config.weights, config.document_types_priority, now);
    RecommendationEngine::new(scorer, ApproxTokenEstimator)
}

#[test]
fn invariant_selection_never_exceeds_budget() {
    let docs: Vec<Document> = (0..20)
        .map(|i| make_doc(&format!("doc{i}"), &"text ".repeat(40 + i * 3)))
        .collect();

    let result = engine().recommend(&docs, 2_000, &Query::new("text requirements"), 0);

    let token_sum: usize = result.recommendations.iter().map(|r| r.tokens).sum();
    assert_eq!(token_sum, result.total_tokens);
    assert!(result.total_tokens <= 2_000, "total {} exceeds budget", result.total_tokens);
    assert!(!result.recommendations.is_empty(), "at least one modest document must fit");
}

#[test]
fn non_positive_budget_yields_empty_selection() {
    let docs = vec![make_doc("doc1", "content"), make_doc("empty", "")];

    for max_tokens in [0, -100] {
        let result = engine().recommend(&docs, max_tokens, &Query::new("req"), 0);
        assert!(result.recommendations.is_empty());
        assert_eq!(result.total_tokens, 0);
        assert_eq!(result.documents_excluded_by_budget, 2);
    }
}

#[test]
fn skipping_continues_past_documents_that_do_not_fit() {
    // Equal scores, so ranked by original position: the large document
    // comes first, fails to fit, and the small one must still be taken.
    let docs = vec![
        make_doc("large", &"L".repeat(8_000)), // 2000 tokens
        make_doc("small", &"s".repeat(400)),   // 100 tokens
    ];

    let result = engine().recommend(&docs, 500, &Query::new("req"), 0);

    assert_eq!(result.recommendations.len(), 1);
    assert_eq!(result.recommendations[0].document_id, "small");
    assert_eq!(result.total_tokens, 100);
    assert_eq!(result.documents_excluded_by_budget, 1);
}

#[test]
fn malformed_documents_are_excluded_without_aborting() {
    let mut missing_id = make_doc("ignored", "some content");
    missing_id.id = None;

    let mut missing_content = make_doc("no-content", "ignored");
    missing_content.content = None;

    let docs = vec![missing_id, make_doc("good", "fine content"), missing_content];

    let result = engine().recommend(&docs, 10_000, &Query::new("req"), 0);

    assert_eq!(result.documents_considered, 3);
    assert_eq!(result.documents_skipped, 2);
    assert_eq!(result.recommendations.len(), 1);
    assert_eq!(result.recommendations[0].document_id, "good");
}

#[test]
fn ties_break_by_original_position() {
    // Identical type, metadata, and content length: identical scores.
    let docs = vec![
        make_doc("first", "aaaa"),
        make_doc("second", "bbbb"),
        make_doc("third", "cccc"),
    ];

    let result = engine().recommend(&docs, 10_000, &Query::new("req"), 0);

    let order: Vec<&str> = result
        .recommendations
        .iter()
        .map(|r| r.document_id.as_str())
        .collect();
    assert_eq!(order, vec!["first", "second", "third"]);
}

#[test]
fn higher_relevance_is_selected_first() {
    let relevant = Document::new("relevant", DocumentType::Solicitation, "cloud migration plan")
        .with_metadata(DocumentMetadata::new().with_keywords(["cloud", "migration"]));
    let filler = make_doc("filler", "unrelated meeting notes");

    let docs = vec![filler, relevant];
    let result = engine().recommend(&docs, 10_000, &Query::new("cloud migration"), 0);

    assert_eq!(result.recommendations[0].document_id, "relevant");
    assert!(
        result.recommendations[0].relevance_score > result.recommendations[1].relevance_score
    );
}

#[test]
fn strictness_excludes_low_relevance_even_under_budget() {
    let relevant = Document::new("relevant", DocumentType::Solicitation, "cloud plan")
        .with_metadata(DocumentMetadata::new().with_keywords(["cloud"]));
    let weak = make_doc("weak", "unrelated");

    let docs = vec![relevant, weak];

    let lenient = engine().recommend(&docs, 10_000, &Query::new("cloud"), 0);
    assert_eq!(lenient.recommendations.len(), 2);

    let strict = engine().recommend(&docs, 10_000, &Query::new("cloud"), 40);
    assert_eq!(strict.recommendations.len(), 1);
    assert_eq!(strict.recommendations[0].document_id, "relevant");
    assert_eq!(strict.documents_excluded_by_strictness, 1);
}

#[test]
fn determinism_identical_inputs_identical_output() {
    let docs: Vec<Document> = (0..10)
        .map(|i| {
            Document::new(format!("doc{i}").as_str(), DocumentType::Reference, "word ".repeat(20 + i).as_str())
                .with_metadata(DocumentMetadata::new().with_keywords([format!("kw{i}")]))
        })
        .collect();

    let query = Query::new("kw3 kw7 word requirements");

    let a = engine().recommend(&docs, 300, &query, 0);
    let b = engine().recommend(&docs, 300, &query, 0);

    let a_json = serde_json::to_string(&a).unwrap();
    let b_json = serde_json::to_string(&b).unwrap();
    assert_eq!(a_json, b_json, "recommendation output is not deterministic");
}

#[test]
fn relevance_scores_are_bounded_in_output() {
    let docs = vec![
        Document::new("a", DocumentType::Solicitation, "cloud kubernetes plan").with_metadata(
            DocumentMetadata::new()
                .with_keywords(["cloud", "kubernetes"])
                .with_technologies(["kubernetes"]),
        ),
        make_doc("b", "plain"),
    ];

    let result = engine().recommend(&docs, 10_000, &Query::new("cloud kubernetes"), 0);
    for rec in &result.recommendations {
        assert!((0.0..=100.0).contains(&rec.relevance_score));
    }
}
