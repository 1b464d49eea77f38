//! Tests for document boundaries and directives.

use citrine::{deserialize, deserialize_docs, Error};

#[test]
fn test_multi_document_stream() {
    let s = "%YAML 1.2\n---\nfoo: 1\n...\n---\nbar: 2";
    let docs = deserialize_docs(s).unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0]["foo"].as_integer().unwrap(), 1);
    assert_eq!(docs[1]["bar"].as_integer().unwrap(), 2);
}

#[test]
fn test_bare_documents() {
    let docs = deserialize_docs("a: 1\n---\nb: 2\n---\nplain scalar").unwrap();
    assert_eq!(docs.len(), 3);
    assert_eq!(docs[2].as_str().unwrap(), "plain scalar");
}

#[test]
fn test_empty_documents() {
    let docs = deserialize_docs("---\n---\n---").unwrap();
    assert_eq!(docs.len(), 3);
    assert!(docs.iter().all(citrine::Node::is_null));
}

#[test]
fn test_document_end_resets_state() {
    // The anchor table does not leak across document boundaries.
    let err = deserialize_docs("&a 1\n...\n*a").unwrap_err();
    assert!(err.to_string().contains('a'), "{err}");
}

#[test]
fn test_single_document_accepts_markers() {
    let doc = deserialize("---\nfoo: 1\n...").unwrap();
    assert_eq!(doc["foo"].as_integer().unwrap(), 1);
}

#[test]
fn test_duplicate_yaml_directive_is_an_error() {
    let err = deserialize("%YAML 1.2\n%YAML 1.2\n---\na: 1").unwrap_err();
    assert!(err.to_string().contains("duplicate"), "{err}");
}

#[test]
fn test_yaml_directive_per_document() {
    // A second document may carry its own version directive.
    let s = "%YAML 1.2\n---\na: 1\n...\n%YAML 1.2\n---\nb: 2";
    assert_eq!(deserialize_docs(s).unwrap().len(), 2);
}

#[test]
fn test_unsupported_yaml_version_is_an_error() {
    assert!(deserialize("%YAML 2.0\n---\na: 1").is_err());
}

#[test]
fn test_higher_minor_versions_read_as_newest() {
    let doc = deserialize("%YAML 1.9\n---\na: yes").unwrap();
    // 1.9 is treated as 1.2, where `yes` is a plain string.
    assert!(doc["a"].is_string());
}

#[test]
fn test_yaml_1_1_booleans() {
    let doc = deserialize("%YAML 1.1\n---\n- yes\n- No\n- ON\n- off").unwrap();
    assert_eq!(doc[0].as_boolean().unwrap(), true);
    assert_eq!(doc[1].as_boolean().unwrap(), false);
    assert_eq!(doc[2].as_boolean().unwrap(), true);
    assert_eq!(doc[3].as_boolean().unwrap(), false);

    // Without the directive the 1.1 spellings are strings.
    let doc = deserialize("- yes\n- off").unwrap();
    assert!(doc[0].is_string());
    assert!(doc[1].is_string());
}

#[test]
fn test_tag_directive() {
    let s = "%TAG !e! tag:example.com,2000:app/\n---\na: !e!thing value";
    let doc = deserialize(s).unwrap();
    assert_eq!(doc["a"].as_str().unwrap(), "value");
    assert_eq!(doc["a"].tag_name(), Some("!e!thing"));
}

#[test]
fn test_tag_directive_can_remap_the_core_schema() {
    let s = "%TAG !n! tag:yaml.org,2002:\n---\na: !n!int 42\nb: !n!str 42";
    let doc = deserialize(s).unwrap();
    assert_eq!(doc["a"].as_integer().unwrap(), 42);
    assert_eq!(doc["b"].as_str().unwrap(), "42");
}

#[test]
fn test_duplicate_tag_directive_is_an_error() {
    let s = "%TAG !e! tag:a/\n%TAG !e! tag:b/\n---\na: 1";
    let err = deserialize(s).unwrap_err();
    assert!(err.to_string().contains("duplicate"), "{err}");
}

#[test]
fn test_undeclared_named_handle_is_an_error() {
    assert!(deserialize("a: !nope!thing value").is_err());
}

#[test]
fn test_truncated_percent_escape_in_prefix_is_an_error() {
    assert!(deserialize("%TAG !e! tag:x%2\n---\na: 1").is_err());
}

#[test]
fn test_unknown_directives_are_ignored() {
    let doc = deserialize("%FOO bar baz\n---\na: 1").unwrap();
    assert_eq!(doc["a"].as_integer().unwrap(), 1);
}

#[test]
fn test_directives_do_not_leak_between_documents() {
    let s = "%TAG !e! tag:yaml.org,2002:\n---\na: !e!int 1\n...\nb: !e!int 2";
    let err = deserialize_docs(s).unwrap_err();
    assert!(matches!(err, Error::Parse(_)), "{err}");
}

#[test]
fn test_content_after_document_end_marker() {
    let docs = deserialize_docs("a: 1\n...\nb: 2").unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[1]["b"].as_integer().unwrap(), 2);
}
