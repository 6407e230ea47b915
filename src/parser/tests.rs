#[cfg(test)]
use super::*;
#[cfg(test)]
use crate::ast::{Expression, LiteralValue, PathSegment, Statement};
use proptest::prelude::*;

fn parse_ok(input: &str) -> Document {
    let (doc, errors) = parse(input);
    assert!(errors.is_empty(), "unexpected errors: {:#?}", errors);
    doc
}

fn codes(errors: &[SdclError]) -> Vec<Option<u32>> {
    errors.iter().map(|e| e.code()).collect()
}

#[test]
fn test_object_expression_statement() {
    let doc = parse_ok(r#"{ "key": "value", "another.key": 123 }"#);

    assert_eq!(doc.statements.len(), 1);
    match &doc.statements[0] {
        Statement::Expression(es) => match &es.expression {
            Expression::Object(obj) => {
                assert_eq!(obj.pairs.len(), 2);
                assert_eq!(obj.keys().collect::<Vec<_>>(), vec!["key", "another.key"]);
                assert!(obj.pairs[0].key.quoted);
            }
            other => panic!("Expected object literal, got {:?}", other),
        },
        other => panic!("Expected expression statement, got {:?}", other),
    }
}

#[test]
fn test_front_matter_and_body() {
    let input = r#"---
title: "Release notes"
version: 2
---
你好: "世界"
summary: (title)
"#;

    let doc = parse_ok(input);
    let fm = doc.front_matter.as_ref().expect("front matter");
    assert_eq!(fm.pairs.len(), 2);
    assert_eq!(fm.pairs[1].key.name, "version");
    assert_eq!(doc.statements.len(), 2);

    match doc.get("summary") {
        Some(Expression::ValueReference(r)) => assert_eq!(r.dotted(), "title"),
        other => panic!("Expected value reference, got {:?}", other),
    }
    assert!(matches!(
        doc.get("你好"),
        Some(Expression::Literal(lit)) if lit.value == LiteralValue::String("世界".into())
    ));
}

#[test]
fn test_leading_comments_before_front_matter() {
    let doc = parse_ok("# header\n\n---\na: 1\n---\nb: 2\n");
    assert!(doc.front_matter.is_some());
    assert_eq!(doc.pairs().count(), 2);
}

#[test]
fn test_unclosed_front_matter() {
    let (doc, errors) = parse("---\na: 1\n");
    assert_eq!(doc.front_matter.map(|fm| fm.pairs.len()), Some(1));
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], SdclError::UnexpectedEof { code: Some(212), .. }));
}

#[test]
fn test_typed_literals() {
    let input = r#"born: date "2024-02-29"
alarm: time "07:30:00"
launch: datetime "2024-02-29T07:30:00.25"
home: country "TW"
blob: base64 "aGVsbG8="
"#;

    let doc = parse_ok(input);
    match doc.get("born") {
        Some(Expression::Literal(lit)) => {
            assert_eq!(lit.value, LiteralValue::Date(chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
            assert_eq!(lit.lexeme, "2024-02-29");
        }
        other => panic!("Expected date literal, got {:?}", other),
    }
    match doc.get("blob") {
        Some(Expression::Literal(lit)) => assert_eq!(lit.value, LiteralValue::Base64(b"hello".to_vec())),
        other => panic!("Expected base64 literal, got {:?}", other),
    }
}

#[test]
fn test_typed_literal_with_non_ascii_digits() {
    let (doc, errors) = parse("d: datetime \"2024-01-01T\u{0661}\u{0662}:30:45\"\nt: time \"\u{0661}2:00:00\"\n");

    assert!(doc.statements.is_empty());
    assert_eq!(errors.len(), 2);
    for error in &errors {
        match error {
            SdclError::InvalidLiteral { code, .. } => assert_eq!(*code, Some(218)),
            other => panic!("Expected InvalidLiteral, got {:?}", other),
        }
    }
}

#[test]
fn test_invalid_date_is_reported() {
    let (doc, errors) = parse("born: date \"2024-02-30\"\nok: 1\n");

    assert_eq!(doc.statements.len(), 1);
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        SdclError::InvalidLiteral { kind, literal, line, column, .. } => {
            assert_eq!(kind, "date");
            assert_eq!(literal, "2024-02-30");
            assert_eq!((*line, *column), (1, 12));
        }
        other => panic!("Expected InvalidLiteral, got {:?}", other),
    }
}

#[test]
fn test_unknown_country_is_reported() {
    let (_, errors) = parse("home: country \"XX\"\n");
    assert_eq!(codes(&errors), vec![Some(218)]);
}

#[test]
fn test_keyword_as_top_level_key() {
    let (doc, errors) = parse("date: 1\n");

    assert!(doc.statements.is_empty());
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        SdclError::SyntaxError { hint: Some(hint), code, .. } => {
            assert!(hint.contains("keyword"));
            assert_eq!(*code, Some(217));
        }
        other => panic!("Expected SyntaxError, got {:?}", other),
    }
}

#[test]
fn test_keyword_allowed_as_object_key() {
    let doc = parse_ok("event: { date: date \"2024-01-01\", null: 1 }\n");
    match doc.get("event") {
        Some(Expression::Object(obj)) => assert_eq!(obj.keys().collect::<Vec<_>>(), vec!["date", "null"]),
        other => panic!("Expected object, got {:?}", other),
    }
}

#[test]
fn test_trailing_comma_rejected() {
    let (doc, errors) = parse("list: [1, 2,]\nobj: { a: 1, }\n");

    assert!(doc.statements.is_empty());
    assert_eq!(codes(&errors), vec![Some(219), Some(219)]);
    assert_eq!(errors[0].position(), Some((1, 12)));
}

#[test]
fn test_empty_object_and_array() {
    let doc = parse_ok("a: {}\nb: []\n");
    assert!(matches!(doc.get("a"), Some(Expression::Object(obj)) if obj.pairs.is_empty()));
    assert!(matches!(doc.get("b"), Some(Expression::Array(arr)) if arr.elements.is_empty()));
}

#[test]
fn test_multiline_object_with_comments() {
    let input = r#"server: {
  host: "localhost", # primary
  port: 8080,

  tags: [
    "a",
    "b"
  ]
}
"#;

    let doc = parse_ok(input);
    match doc.get("server") {
        Some(Expression::Object(obj)) => {
            assert_eq!(obj.pairs.len(), 3);
            assert!(matches!(obj.get("tags"), Some(Expression::Array(arr)) if arr.elements.len() == 2));
        }
        other => panic!("Expected object, got {:?}", other),
    }
}

#[test]
fn test_collects_multiple_errors_in_one_pass() {
    let input = "a: 1
b: : 2
c: 3
d 4
e: [1, 2
f: 6
";

    let (doc, errors) = parse(input);

    let keys: Vec<_> = doc.pairs().map(|kv| kv.key.name.as_str()).collect();
    assert_eq!(keys, vec!["a", "c"]);
    assert_eq!(errors.len(), 3);
    assert_eq!(errors[0].position(), Some((2, 4)));
    assert_eq!(errors[1].position(), Some((4, 3)));
    assert_eq!(errors[1].code(), Some(204));
}

#[test]
fn test_recovery_resumes_after_unbalanced_line() {
    let (doc, errors) = parse("a: { x: , y: 2 }\nb: 2\n");

    assert_eq!(errors.len(), 1);
    let keys: Vec<_> = doc.pairs().map(|kv| kv.key.name.as_str()).collect();
    assert_eq!(keys, vec!["b"]);
}

#[test]
fn test_duplicate_keys() {
    let (doc, errors) = parse("---\na: 1\n---\na: 2\nb: { x: 1, x: 2 }\n");

    assert_eq!(codes(&errors), vec![Some(215), Some(215)]);
    assert_eq!(doc.statements.len(), 1);
    match doc.get("b") {
        Some(Expression::Object(obj)) => assert_eq!(obj.pairs.len(), 1),
        other => panic!("Expected object, got {:?}", other),
    }
}

#[test]
fn test_statements_need_their_own_line() {
    let (_, errors) = parse("a: 1 b: 2\n");
    assert_eq!(codes(&errors), vec![Some(206)]);
}

#[test]
fn test_trailing_comment_after_statement() {
    let doc = parse_ok("a: 1 # the answer\n");
    assert_eq!(doc.statements.len(), 1);
}

#[test]
fn test_bare_word_is_not_a_value() {
    let (_, errors) = parse("a: b\n");
    match &errors[..] {
        [SdclError::SyntaxError { code: Some(210), hint: Some(hint), .. }] => assert!(hint.contains("references")),
        other => panic!("Expected one SyntaxError, got {:?}", other),
    }
}

#[test]
fn test_reference_forms() {
    let doc = parse_ok("a: (server.host)\nb: ((server.motd))\nc: .base.server.port\nd: (items.0)\n");

    match doc.get("a") {
        Some(Expression::ValueReference(r)) => assert_eq!(r.dotted(), "server.host"),
        other => panic!("Expected value reference, got {:?}", other),
    }
    assert!(matches!(doc.get("b"), Some(Expression::ContentInclusion(r)) if r.path.len() == 2));
    match doc.get("c") {
        Some(Expression::ExternalReference(r)) => {
            assert_eq!(r.path.len(), 3);
            assert_eq!(r.path[0].as_str(), "base");
        }
        other => panic!("Expected external reference, got {:?}", other),
    }
    match doc.get("d") {
        Some(Expression::ValueReference(r)) => {
            assert!(matches!(&r.path[1], PathSegment::Index { value, .. } if value == "0"));
        }
        other => panic!("Expected value reference, got {:?}", other),
    }
    assert_eq!(doc.external_document_ids(), vec!["base".to_string()]);
}

#[test]
fn test_numeric_path_segments() {
    let doc = parse_ok("a: (list.0.1)\nb: .doc.2.10.x\n");

    let index = |seg: &PathSegment| match seg {
        PathSegment::Index { value, position } => (value.clone(), position.line, position.column, position.offset),
        other => panic!("Expected index segment, got {:?}", other),
    };
    match doc.get("a") {
        Some(Expression::ValueReference(r)) => {
            assert_eq!(r.path.len(), 3);
            assert_eq!(index(&r.path[1]), ("0".to_string(), 1, 10, 9));
            assert_eq!(index(&r.path[2]), ("1".to_string(), 1, 12, 11));
        }
        other => panic!("Expected value reference, got {:?}", other),
    }
    match doc.get("b") {
        Some(Expression::ExternalReference(r)) => {
            assert_eq!(r.dotted(), "doc.2.10.x");
            assert_eq!(index(&r.path[1]), ("2".to_string(), 2, 9, 22));
            assert_eq!(index(&r.path[2]), ("10".to_string(), 2, 11, 24));
        }
        other => panic!("Expected external reference, got {:?}", other),
    }
    assert_eq!(doc.to_string(), "a: (list.0.1)\nb: .doc.2.10.x\n");
}

#[test]
fn test_mismatched_reference_parens() {
    let (_, errors) = parse("a: (b))\n");
    match &errors[..] {
        [SdclError::SyntaxError { code: Some(225), hint: Some(hint), .. }] => assert!(hint.contains("content inclusion")),
        other => panic!("Expected one SyntaxError, got {:?}", other),
    }
}

#[test]
fn test_nesting_limit() {
    let limits = Limits { max_nesting_depth: 2, ..Limits::default() };

    let (_, errors) = parse_with_limits("ok: [[1]]\nbad: [[[1]]]\nafter: 1\n", limits);
    assert_eq!(codes(&errors), vec![Some(223)]);

    let mut parser = Parser::new("after: 1\n").with_limits(limits);
    let doc = parser.parse_document();
    assert!(parser.errors().is_empty());
    assert_eq!(doc.statements.len(), 1);
}

#[test]
fn test_illegal_character_reported_once() {
    let (doc, errors) = parse("a: @\nb: 1\n");

    assert_eq!(doc.statements.len(), 1);
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], SdclError::UnexpectedCharacter { character: '@', line: 1, column: 4, .. }));
}

#[test]
fn test_unclosed_string_reports_lexical_error() {
    let (_, errors) = parse("a: \"open\n");
    assert!(errors.iter().any(|e| matches!(e, SdclError::UnclosedString { .. })));
}

#[test]
fn test_integer_overflow() {
    let (_, errors) = parse("a: 99999999999999999999\n");
    assert_eq!(codes(&errors), vec![Some(216)]);
}

#[test]
fn test_object_keeps_raw_source() {
    let doc = parse_ok("a: {x:  1,\n  y: [1,2]}\n");
    match doc.get("a") {
        Some(Expression::Object(obj)) => assert_eq!(obj.raw, "{x:  1,\n  y: [1,2]}"),
        other => panic!("Expected object, got {:?}", other),
    }
}

#[test]
fn test_printer_is_idempotent() {
    let inputs = [
        "---\ntitle: \"T\"\n---\na: 1\n",
        "a: {x: 1,\n \"y z\": [1.50, true, null]}\n",
        "when: datetime \"2024-01-01 10:00:00\"\nwhere: country \"NZ\"\n",
        "a: (b.c)\nd: ((e))\nf: .g.h\n{ \"k\": [] }\n",
        "# comment only\n\n",
    ];

    for input in inputs {
        let once = parse_ok(input).to_string();
        let twice = parse_ok(&once).to_string();
        assert_eq!(once, twice, "printer not idempotent for {:?}", input);
    }
}

#[test]
fn test_empty_input() {
    let doc = parse_ok("");
    assert!(doc.front_matter.is_none());
    assert!(doc.statements.is_empty());
}

fn value_source() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        any::<u32>().prop_map(|n| n.to_string()),
        "[a-z ]{0,8}".prop_map(|s| format!("\"{}\"", s)),
        any::<bool>().prop_map(|b| b.to_string()),
        Just("null".to_string()),
        "x[a-z]{0,3}(\\.x[a-z]{0,3}){0,2}".prop_map(|path| format!("({})", path)),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(|items| format!("[{}]", items.join(", "))),
            prop::collection::vec(inner, 0..4).prop_map(|items| {
                let pairs: Vec<String> = items.iter().enumerate().map(|(i, v)| format!("f{}: {}", i, v)).collect();
                format!("{{ {} }}", pairs.join(", "))
            }),
        ]
    })
}

proptest! {
    #[test]
    fn prop_printer_is_idempotent(values in prop::collection::vec(value_source(), 0..6)) {
        let source: String = values.iter().enumerate().map(|(i, v)| format!("k{}: {}\n", i, v)).collect();
        let (doc, errors) = parse(&source);
        prop_assert!(errors.is_empty(), "errors for {:?}: {:?}", source, errors);

        let once = doc.to_string();
        let (reparsed, errors) = parse(&once);
        prop_assert!(errors.is_empty(), "printed text does not parse: {:?}", once);
        prop_assert_eq!(reparsed.to_string(), once);
    }
}
