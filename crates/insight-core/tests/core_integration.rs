#![allow(clippy::unwrap_used, clippy::expect_used)]

use insight_core::labels::Labels;
use insight_core::{InsightError, QueryMatch};

// ---------------------------------------------------------------------------
// 1. QueryMatch serialization roundtrip
// ---------------------------------------------------------------------------

#[test]
fn query_match_serialization_roundtrip() {
    let m = QueryMatch {
        score: 0.125,
        summary: "[domain:payments][tag:fees] Partner 'Acme': fees 12.50".to_string(),
        domain: "payments".to_string(),
        tag: "fees".to_string(),
    };

    let json = serde_json::to_string(&m).unwrap();
    let deserialized: QueryMatch = serde_json::from_str(&json).unwrap();

    assert_eq!(deserialized.score, m.score);
    assert_eq!(deserialized.summary, m.summary);
    assert_eq!(deserialized.domain, "payments");
    assert_eq!(deserialized.tag, "fees");
}

// ---------------------------------------------------------------------------
// 2. Error display carries operator-facing detail
// ---------------------------------------------------------------------------

#[test]
fn error_messages_name_the_violation() {
    let err = InsightError::DimensionMismatch {
        expected: 256,
        actual: 384,
    };
    let text = err.to_string();
    assert!(text.contains("256"));
    assert!(text.contains("384"));

    let err = InsightError::OutOfRange {
        position: 9,
        len: 3,
    };
    let text = err.to_string();
    assert!(text.contains('9'));
    assert!(text.contains('3'));

    assert!(InsightError::EmptyStore.to_string().contains("empty"));
    assert!(InsightError::EmptyBatch.to_string().contains("empty"));
}

#[test]
fn io_errors_convert_into_insight_errors() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "locked");
    let err: InsightError = io.into();
    assert!(matches!(err, InsightError::Io(_)));
}

// ---------------------------------------------------------------------------
// 3. Label parsing through the public API
// ---------------------------------------------------------------------------

#[test]
fn labels_parse_the_producer_convention() {
    let labels = Labels::parse("[domain:payments][tag:latefee_rev] Partner 'X': fees up 4%");
    assert_eq!(labels.domain, "payments");
    assert_eq!(labels.tag, "latefee_rev");

    assert_eq!(Labels::parse("no tags here"), Labels::unknown());
}
