#[cfg(test)]
use super::*;
#[cfg(test)]
use crate::parser::parse;

fn parse_ok(input: &str) -> Document {
    let (doc, errors) = parse(input);
    assert!(errors.is_empty(), "unexpected parse errors: {:#?}", errors);
    doc
}

fn resolve_str(input: &str) -> (ResolvedDocument, Vec<SdclError>) {
    resolve(&parse_ok(input), &NoDocuments)
}

fn kinds(errors: &[SdclError]) -> Vec<ResolutionErrorKind> {
    errors.iter().filter_map(|e| e.resolution_kind()).collect()
}

fn string(s: &str) -> Value {
    Value::String(s.to_string())
}

#[test]
fn test_front_matter_reference() {
    let (resolved, errors) = resolve_str("---\nkey: \"value\"\n---\n(key)\n");

    assert!(errors.is_empty());
    let exprs: Vec<_> = resolved.expressions().collect();
    assert_eq!(exprs.len(), 1);
    assert_eq!(**exprs[0], string("value"));
}

#[test]
fn test_forward_and_backward_references() {
    let (resolved, errors) = resolve_str("a: (b)\nb: 2\nc: (b)\n");

    assert!(errors.is_empty());
    assert_eq!(resolved.lookup("a"), Some(&Value::Integer(2)));
    assert_eq!(resolved.lookup("c"), Some(&Value::Integer(2)));
}

#[test]
fn test_nested_path_through_references() {
    let input = "a: (b)
b: { c: { d: 5 } }
x: (a.c.d)
";
    let (resolved, errors) = resolve_str(input);

    assert!(errors.is_empty());
    assert_eq!(resolved.lookup("x"), Some(&Value::Integer(5)));
    assert_eq!(resolved.lookup("a.c.d"), Some(&Value::Integer(5)));
}

#[test]
fn test_sibling_reference_is_not_a_cycle() {
    let (resolved, errors) = resolve_str("a: { x: 1, y: (a.x) }\n");

    assert!(errors.is_empty(), "{:?}", errors);
    assert_eq!(resolved.lookup("a.y"), Some(&Value::Integer(1)));
}

#[test]
fn test_content_inclusion_cycle() {
    let (resolved, errors) = resolve_str("a: ((b))\nb: ((a))\nc: 1\n");

    assert_eq!(kinds(&errors), vec![ResolutionErrorKind::Cycle]);
    assert!(errors[0].is_fatal());
    assert!(resolved.get("a").is_none());
    assert!(resolved.get("b").is_none());
    assert_eq!(resolved.lookup("c"), Some(&Value::Integer(1)));
}

#[test]
fn test_self_reference_cycle_message() {
    let (resolved, errors) = resolve_str("a: (a)\n");

    assert!(resolved.statements.is_empty());
    match &errors[..] {
        [SdclError::ResolutionError { kind: ResolutionErrorKind::Cycle, message, line, column, .. }] => {
            assert!(message.contains("a -> a"), "{}", message);
            assert_eq!((*line, *column), (1, 4));
        }
        other => panic!("Expected one cycle error, got {:?}", other),
    }
}

#[test]
fn test_cycle_in_expression_statement() {
    let (resolved, errors) = resolve_str("a: (b)\nb: (a)\n(a)\n\"kept\"\n");

    assert_eq!(kinds(&errors), vec![ResolutionErrorKind::Cycle]);
    let exprs: Vec<_> = resolved.expressions().collect();
    assert_eq!(exprs.len(), 1);
    assert_eq!(**exprs[0], string("kept"));
}

#[test]
fn test_references_share_resolved_value() {
    let (resolved, errors) = resolve_str("a: { x: 1 }\nb: (a)\nc: (a)\nd: (b)\n");

    assert!(errors.is_empty());
    let a = resolved.get("a").unwrap();
    for key in ["b", "c", "d"] {
        assert!(Arc::ptr_eq(a, resolved.get(key).unwrap()), "{} does not share a", key);
    }
}

#[test]
fn test_diamond_graph_resolves_each_node_once() {
    let mut input = String::new();
    for i in 0..40 {
        input.push_str(&format!("k{}: [(k{}), (k{})]\n", i, i + 1, i + 1));
    }
    input.push_str("k40: \"leaf\"\n");

    let (resolved, errors) = resolve_str(&input);

    assert!(errors.is_empty());
    let top = resolved.get("k0").and_then(|v| v.as_array()).unwrap();
    assert!(Arc::ptr_eq(&top[0], &top[1]));
    assert!(Arc::ptr_eq(&top[0], resolved.get("k1").unwrap()));
}

#[test]
fn test_depth_limit() {
    let limits = Limits { max_reference_depth: 4, ..Limits::default() };
    let doc = parse_ok("a: (b)\nb: (c)\nc: (d)\nd: (e)\ne: (f)\nf: 1\n");

    let (resolved, errors) = resolve_with_limits(&doc, &NoDocuments, limits);

    assert_eq!(
        kinds(&errors),
        vec![ResolutionErrorKind::DepthExceeded, ResolutionErrorKind::DepthExceeded]
    );
    let keys: Vec<_> = resolved.keys().collect();
    assert_eq!(keys, vec!["c", "d", "e", "f"]);
    assert_eq!(resolved.lookup("c"), Some(&Value::Integer(1)));
}

#[test]
fn test_depth_limit_ignores_entry_order() {
    let limits = Limits { max_reference_depth: 3, ..Limits::default() };
    let forward = parse_ok("a: (b)\nb: (c)\nc: (d)\nd: 1\n");
    let backward = parse_ok("d: 1\nc: (d)\nb: (c)\na: (b)\n");

    let (forward, forward_errors) = resolve_with_limits(&forward, &NoDocuments, limits);
    let (backward, backward_errors) = resolve_with_limits(&backward, &NoDocuments, limits);

    let mut forward_keys: Vec<_> = forward.keys().collect();
    let mut backward_keys: Vec<_> = backward.keys().collect();
    forward_keys.sort();
    backward_keys.sort();
    assert_eq!(forward_keys, vec!["b", "c", "d"]);
    assert_eq!(backward_keys, forward_keys);
    assert_eq!(kinds(&forward_errors), vec![ResolutionErrorKind::DepthExceeded]);
    assert_eq!(kinds(&backward_errors), vec![ResolutionErrorKind::DepthExceeded]);
}

#[test]
fn test_nested_literals_along_reference_chain() {
    let mut input = String::new();
    for i in 0..20 {
        input.push_str(&format!("e{}: {}(e{}){}\n", i, "[".repeat(120), i + 1, "]".repeat(120)));
    }
    input.push_str("e20: 1\n");
    let doc = parse_ok(&input);

    let (resolved, errors) = resolve(&doc, &NoDocuments);

    assert!(!errors.is_empty());
    assert!(errors.iter().all(|e| e.resolution_kind() == Some(ResolutionErrorKind::DepthExceeded)));
    let keys: Vec<_> = resolved.keys().collect();
    assert_eq!(keys, vec!["e19", "e20"]);
    match &errors[0] {
        SdclError::ResolutionError { message, .. } => assert!(message.contains("192 levels"), "{}", message),
        other => panic!("Expected ResolutionError, got {:?}", other),
    }
}

#[test]
fn test_nesting_counts_against_reference_budget() {
    let limits = Limits { max_reference_depth: 3, max_nesting_depth: 2, ..Limits::default() };
    let doc = parse_ok("a: [[(b)]]\nb: { c: (d) }\nd: 1\nflat: [(b)]\n");

    let (resolved, errors) = resolve_with_limits(&doc, &NoDocuments, limits);

    assert_eq!(kinds(&errors), vec![ResolutionErrorKind::DepthExceeded]);
    assert!(resolved.lookup("a").is_none());
    assert!(resolved.lookup("flat").is_some());
    assert_eq!(resolved.lookup("b.c"), Some(&Value::Integer(1)));
}

#[test]
fn test_long_chain_within_default_depth() {
    let mut input = String::new();
    for i in 0..50 {
        input.push_str(&format!("k{}: (k{})\n", i, i + 1));
    }
    input.push_str("k50: true\n");

    let (resolved, errors) = resolve_str(&input);
    assert!(errors.is_empty());
    assert_eq!(resolved.lookup("k0"), Some(&Value::Boolean(true)));
}

#[test]
fn test_unresolved_reference_becomes_null() {
    let (resolved, errors) = resolve_str("x: (missing)\ny: (x)\nz: { inner: (x.deeper) }\n");

    assert_eq!(resolved.lookup("x"), Some(&Value::Null));
    assert_eq!(resolved.lookup("y"), Some(&Value::Null));
    assert_eq!(
        kinds(&errors),
        vec![ResolutionErrorKind::Unresolved, ResolutionErrorKind::NotAnObject]
    );
    assert_eq!(errors[0].position(), Some((1, 4)));
}

#[test]
fn test_array_index_segment() {
    let (resolved, errors) = resolve_str("list: [1, 2]\nfirst: (list.0)\n");

    assert_eq!(kinds(&errors), vec![ResolutionErrorKind::ArrayIndex]);
    assert_eq!(errors[0].position(), Some((2, 14)));
    assert_eq!(resolved.lookup("first"), Some(&Value::Null));
}

#[test]
fn test_array_index_after_index() {
    let (resolved, errors) = resolve_str("list: [[1, 2]]\nsecond: (list.0.1)\n");

    assert_eq!(kinds(&errors), vec![ResolutionErrorKind::ArrayIndex]);
    assert_eq!(errors[0].position(), Some((2, 15)));
    assert_eq!(resolved.lookup("second"), Some(&Value::Null));
}

#[test]
fn test_descending_into_scalar_or_array() {
    let (_, errors) = resolve_str("port: 80\nx: (port.number)\nl: [1]\ny: (l.a)\n");

    assert_eq!(
        kinds(&errors),
        vec![ResolutionErrorKind::NotAnObject, ResolutionErrorKind::NotAnObject]
    );
    match &errors[1] {
        SdclError::ResolutionError { message, .. } => assert!(message.contains("an array"), "{}", message),
        other => panic!("Expected resolution error, got {:?}", other),
    }
}

#[test]
fn test_missing_external_document() {
    let (resolved, errors) = resolve_str("a: .nope.key\nb: .nope\n");

    assert_eq!(
        kinds(&errors),
        vec![ResolutionErrorKind::MissingDocument, ResolutionErrorKind::MissingDocument]
    );
    assert_eq!(resolved.lookup("a"), Some(&Value::Null));
}

#[test]
fn test_external_references_resolve_in_their_own_document() {
    let mut source = IndexMap::new();
    source.insert(
        "base".to_string(),
        parse_ok("host: \"example.org\"\nport: (default_port)\ndefault_port: 8080\n"),
    );
    let doc = parse_ok("url: .base.host\nport: .base.port\nall: .base\ndefault_port: 1\n");

    let (resolved, errors) = resolve(&doc, &source);

    assert!(errors.is_empty(), "{:?}", errors);
    assert_eq!(resolved.lookup("url"), Some(&string("example.org")));
    assert_eq!(resolved.lookup("port"), Some(&Value::Integer(8080)));
    let all = resolved.get("all").and_then(|v| v.as_object()).unwrap();
    assert_eq!(all.keys().collect::<Vec<_>>(), vec!["host", "port", "default_port"]);
    assert!(Arc::ptr_eq(&all["port"], resolved.get("port").unwrap()));
}

#[test]
fn test_content_inclusion_splices_raw_text() {
    let input = r#"obj: {x:  1, y: [1,2]}
raw: ((obj))
name: "sdcl"
greeting: ((name))
when: date "2024-01-01"
w: ((when))
chain: (obj)
via_chain: ((chain))
nested: { b: (obj) }
through_value: ((nested.b.x))
"#;

    let (resolved, errors) = resolve_str(input);

    assert!(errors.is_empty(), "{:?}", errors);
    assert_eq!(resolved.lookup("raw"), Some(&string("{x:  1, y: [1,2]}")));
    assert_eq!(resolved.lookup("greeting"), Some(&string("sdcl")));
    assert_eq!(resolved.lookup("w"), Some(&string("2024-01-01")));
    assert_eq!(resolved.lookup("via_chain"), Some(&string("{x:  1, y: [1,2]}")));
    assert_eq!(resolved.lookup("through_value"), Some(&string("1")));
}

#[test]
fn test_batch_isolates_failing_document() {
    let mut source = IndexMap::new();
    source.insert("good".to_string(), parse_ok("a: 1\nb: (a)\n"));
    source.insert("bad".to_string(), parse_ok("x: (y)\ny: (x)\nz: 3\n"));

    let (resolved, errors) = resolve_all(&source, &["good", "bad", "missing"]);

    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved["good"].lookup("b"), Some(&Value::Integer(1)));
    assert_eq!(resolved["bad"].keys().collect::<Vec<_>>(), vec!["z"]);
    assert_eq!(
        kinds(&errors),
        vec![ResolutionErrorKind::Cycle, ResolutionErrorKind::MissingDocument]
    );
}

#[test]
fn test_cycle_across_documents() {
    let mut source = IndexMap::new();
    source.insert("a".to_string(), parse_ok("x: .b.y\n"));
    source.insert("b".to_string(), parse_ok("y: .a.x\n"));

    let (resolved, errors) = resolve_all(&source, &["a", "b"]);

    assert!(resolved.values().all(|doc| doc.statements.is_empty()));
    match &errors[..] {
        [SdclError::ResolutionError { kind: ResolutionErrorKind::Cycle, message, .. }] => {
            assert!(message.contains(".a.x -> .b.y -> .a.x"), "{}", message)
        }
        other => panic!("Expected one cycle error, got {:?}", other),
    }
}

#[test]
fn test_resolved_document_prints_as_sdcl() {
    let (resolved, _) = resolve_str("---\nt: \"T\"\n---\na: (t)\n{ k: [1, (t)] }\n");
    assert_eq!(resolved.to_string(), "---\nt: \"T\"\n---\na: \"T\"\n{ \"k\": [1, \"T\"] }\n");
}

#[test]
fn test_batch_with_limits() {
    let mut source = IndexMap::new();
    source.insert("deep".to_string(), parse_ok("a: (b)\nb: (c)\nc: 1\n"));
    source.insert("flat".to_string(), parse_ok("x: 1\ny: (x)\n"));
    let limits = Limits { max_reference_depth: 2, ..Limits::default() };

    let (resolved, errors) = resolve_all_with_limits(&source, &["deep", "flat"], limits);

    assert_eq!(kinds(&errors), vec![ResolutionErrorKind::DepthExceeded]);
    assert_eq!(resolved["deep"].keys().collect::<Vec<_>>(), vec!["b", "c"]);
    assert_eq!(resolved["flat"].lookup("y"), Some(&Value::Integer(1)));

    let (resolved, errors) = resolve_all(&source, &["deep"]);
    assert!(errors.is_empty());
    assert_eq!(resolved["deep"].lookup("a"), Some(&Value::Integer(1)));
}
