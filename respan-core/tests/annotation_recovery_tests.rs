//! End-to-end annotation recovery through the public API

use respan_core::{
    AnchorContext, Annotation, ChunkRef, Config, ConfidenceTier, Error, RecoveryMethod, Span,
    SpanReconciler,
};

fn annotation(id: &str, original: &str, start: usize, end: usize) -> Annotation {
    Annotation {
        id: id.to_string(),
        span: Span::new(start, end),
        original_text: original.to_string(),
        anchor_context: AnchorContext::default(),
        source_chunk_refs: Vec::new(),
    }
}

#[test]
fn unchanged_document_recovers_exactly() {
    let reconciler = SpanReconciler::new();
    let output = reconciler
        .recover_annotations("ABCDEFGHIJ", &[annotation("a1", "DEF", 3, 6)], &[])
        .unwrap();

    let recovered = &output.spans[0];
    assert_eq!(recovered.method, RecoveryMethod::Exact);
    assert_eq!(recovered.confidence, 1.0);
    assert_eq!(recovered.tier, ConfidenceTier::High);
    assert_eq!(recovered.span, Some(Span::new(3, 6)));
    assert_eq!(recovered.text.as_deref(), Some("DEF"));
    assert!(!recovered.needs_review);

    assert_eq!(output.summary.total, 1);
    assert_eq!(output.summary.resolved, 1);
    assert!(!output.summary.low_coverage);
}

#[test]
fn insertion_before_the_span_shifts_the_result() {
    // One character inserted at offset 2; the annotated text is still
    // present verbatim, one position to the right.
    let reconciler = SpanReconciler::new();
    let output = reconciler
        .recover_annotations("ABXCDEFGHIJ", &[annotation("a1", "DEF", 3, 6)], &[])
        .unwrap();

    let recovered = &output.spans[0];
    assert_eq!(recovered.span, Some(Span::new(4, 7)));
    assert_eq!(recovered.text.as_deref(), Some("DEF"));
}

#[test]
fn results_preserve_input_order() {
    let text = "one two three four five";
    let reconciler = SpanReconciler::new();
    let annotations = vec![
        annotation("last", "five", 19, 23),
        annotation("first", "one", 0, 3),
        annotation("middle", "three", 8, 13),
    ];
    let output = reconciler.recover_annotations(text, &annotations, &[]).unwrap();
    let ids: Vec<&str> = output.spans.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["last", "first", "middle"]);
}

#[test]
fn lost_annotations_interpolate_from_recovered_neighbors() {
    // Old layout: "aaa NEEDLE bbb LOSTX ccc"; the revised text gained a
    // two-byte prefix and the second annotated phrase was rewritten.
    let revised = "zzaaa NEEDLE bbb QWERT ccc";
    let reconciler = SpanReconciler::new();
    let annotations = vec![
        annotation("kept", "NEEDLE", 4, 10),
        annotation("gone", "LOSTX", 15, 20),
    ];
    let output = reconciler.recover_annotations(revised, &annotations, &[]).unwrap();

    let kept = &output.spans[0];
    assert_eq!(kept.method, RecoveryMethod::Exact);
    assert_eq!(kept.span, Some(Span::new(6, 12)));

    // The lost record borrows the neighbor's +2 displacement.
    let gone = &output.spans[1];
    assert_eq!(gone.method, RecoveryMethod::Lost);
    assert_eq!(gone.confidence, 0.0);
    assert_eq!(gone.tier, ConfidenceTier::None);
    assert!(gone.needs_review);
    assert_eq!(gone.span, Some(Span::new(17, 22)));
    assert_eq!(gone.text.as_deref(), Some("QWERT"));

    // One of two records resolved: below the 0.7 coverage threshold.
    assert_eq!(output.summary.resolved, 1);
    assert!((output.summary.rate - 0.5).abs() < f64::EPSILON);
    assert!(output.summary.low_coverage);
}

#[test]
fn lost_without_any_neighbor_has_no_span() {
    let reconciler = SpanReconciler::new();
    let output = reconciler
        .recover_annotations("nothing matches here", &[annotation("a1", "zzqqxx phrase", 0, 13)], &[])
        .unwrap();
    let recovered = &output.spans[0];
    assert_eq!(recovered.method, RecoveryMethod::Lost);
    assert_eq!(recovered.span, None);
    assert!(recovered.needs_review);
}

#[test]
fn chunk_bounded_recovery_is_flagged_for_review() {
    // Anchors appear twice; the recorded offset favors the decoy pair, and
    // only the referenced chunk isolates the real occurrence.
    let filler = "y".repeat(200);
    let text = format!("[[ x ]] {filler} [[ hey world ]] end");
    let real = text.rfind("[[").unwrap();

    let mut ann = annotation("a1", "hello world", 3, 14);
    ann.anchor_context = AnchorContext {
        before: "[[ ".to_string(),
        after: " ]]".to_string(),
    };
    ann.source_chunk_refs = vec!["c9".to_string()];
    let chunks = vec![ChunkRef {
        id: "c9".to_string(),
        span: Span::new(real, text.len()),
    }];

    let reconciler = SpanReconciler::new();
    let output = reconciler.recover_annotations(&text, &[ann], &chunks).unwrap();
    let recovered = &output.spans[0];
    assert_eq!(recovered.method, RecoveryMethod::ChunkBounded);
    assert_eq!(recovered.confidence, 0.8);
    assert_eq!(recovered.tier, ConfidenceTier::Medium);
    assert!(recovered.needs_review);
    assert_eq!(recovered.text.as_deref(), Some("hey world"));
}

#[test]
fn review_threshold_is_tunable() {
    let text = "The quick braun fox jumps over the lazy dog near the river bank today.";
    let ann = annotation("a1", "quick brown fox jumps", 4, 25);

    let strict = SpanReconciler::new();
    let output = strict.recover_annotations(text, &[ann.clone()], &[]).unwrap();
    assert_eq!(output.spans[0].method, RecoveryMethod::Trigram);
    assert!(output.spans[0].needs_review);

    let lenient = SpanReconciler::with_config(
        Config::builder().review_threshold(0.7).build().unwrap(),
    )
    .unwrap();
    let output = lenient.recover_annotations(text, &[ann], &[]).unwrap();
    assert_eq!(output.spans[0].method, RecoveryMethod::Trigram);
    assert!(!output.spans[0].needs_review);
}

#[test]
fn empty_document_rejects_the_request() {
    let reconciler = SpanReconciler::new();
    let err = reconciler
        .recover_annotations("", &[annotation("a1", "x", 0, 1)], &[])
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[test]
fn malformed_spans_reject_the_whole_batch() {
    let reconciler = SpanReconciler::new();
    let annotations = vec![
        annotation("good", "DEF", 3, 6),
        annotation("bad", "GH", 8, 2), // inverted
    ];
    let err = reconciler
        .recover_annotations("ABCDEFGHIJ", &annotations, &[])
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[test]
fn out_of_bounds_chunk_refs_reject_the_request() {
    let reconciler = SpanReconciler::new();
    let chunks = vec![ChunkRef {
        id: "c1".to_string(),
        span: Span::new(0, 99),
    }];
    let err = reconciler
        .recover_annotations("short text", &[annotation("a1", "text", 6, 10)], &chunks)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}
