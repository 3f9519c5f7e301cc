use knit_json::{ParseErrorKind, from_str, query};
use knit_testhelpers::test;
use miette::Diagnostic;

#[test]
fn parse_error_display() {
    let err = from_str("{\n  \"a\": 1,\n  \"b\" 2\n}").unwrap_err();
    insta::assert_snapshot!(err, @"line 3, column 7: expected ':' after key, got '2'");

    let err = from_str("[1, 2,]").unwrap_err();
    insta::assert_snapshot!(err, @"line 1, column 7: trailing comma");

    let err = from_str(r#"{"k": "\u0041"}"#).unwrap_err();
    insta::assert_snapshot!(err, @r"line 1, column 8: \u escapes are not supported");
}

#[test]
fn parse_error_is_a_diagnostic() {
    let err = from_str("[1, 2}").unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::WrongBracket { .. }));
    assert_eq!(
        err.code().map(|c| c.to_string()).as_deref(),
        Some("json::wrong_bracket")
    );
    assert!(err.source_code().is_some());

    let labels: Vec<_> = err.labels().into_iter().flatten().collect();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].offset(), 5);
    assert_eq!(labels[0].len(), 1);
    assert_eq!(labels[0].label(), Some("expected ']'"));
}

#[test]
fn eof_label_is_empty() {
    let err = from_str("[1, 2").unwrap_err();
    let labels: Vec<_> = err.labels().into_iter().flatten().collect();
    assert_eq!(labels[0].offset(), 5);
    assert_eq!(labels[0].len(), 0);
}

#[test]
fn query_error_display() {
    let doc = from_str(r#"{"n": 1}"#).unwrap();
    let err = query(&doc, ".n.deeper").unwrap_err();
    insta::assert_snapshot!(err, @"cannot apply `.deeper` (step 1) to integer");
    assert_eq!(err.kind.code(), "query::type_mismatch");

    let err = query(&doc, ".[x]").unwrap_err();
    insta::assert_snapshot!(err, @"malformed query path at byte 2: index must be a non-negative integer");
}

#[test]
fn invalid_utf8_keeps_a_snippet() {
    let err = knit_json::from_slice(b"[\"ok\", \"\xff\"]").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::InvalidUtf8);
    assert!(err.source_code().is_some());
    let labels: Vec<_> = err.labels().into_iter().flatten().collect();
    assert_eq!(labels[0].offset(), 8);
}
