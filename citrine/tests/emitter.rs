//! Tests for the serializer.

use citrine::{deserialize, deserialize_docs, serialize, serialize_docs, Node};

/// Deserialize `input`, serialize the tree, deserialize the output and check
/// that both trees are equal. Returns the emitted string so callers can also
/// assert on the exact formatting.
fn roundtrip(input: &str) -> String {
    let original = deserialize(input).unwrap();
    let emitted = serialize(&original).unwrap();
    println!("original:\n{input}\nemitted:\n{emitted}");

    let reparsed = deserialize(&emitted)
        .unwrap_or_else(|e| panic!("the emitted document does not parse: {e}\n{emitted}"));
    assert_eq!(original, reparsed);
    emitted
}

#[test]
fn test_emit_simple() {
    roundtrip(
        "
# comment
a0 bb: val
a1:
  b1: 4
  b2: d
a2: 4 # i'm comment
a3: [1, 2, 3]
a4:
  - [a1, a2]
  - 2
",
    );
}

#[test]
fn test_emit_formatting() {
    let emitted = roundtrip("a: 1\nb:\n  - x\n  - y\nc:\n  d: 2\n");
    assert_eq!(emitted, "a: 1\nb:\n  - x\n  - y\nc:\n  d: 2\n");
}

#[test]
fn test_emit_scalar_document() {
    assert_eq!(serialize(&Node::string("hello")).unwrap(), "hello\n");
    assert_eq!(serialize(&Node::null()).unwrap(), "null\n");
    assert_eq!(roundtrip("just a scalar"), "just a scalar\n");
}

#[test]
fn test_emit_empty_containers() {
    assert_eq!(roundtrip("a: []\nb: {}"), "a: []\nb: {}\n");
    assert_eq!(serialize(&Node::sequence()).unwrap(), "[]\n");
    assert_eq!(serialize(&Node::mapping()).unwrap(), "{}\n");
}

#[test]
fn test_emit_special_floats() {
    let emitted = roundtrip("- .inf\n- -.inf\n- .nan\n- 2.5");
    assert_eq!(emitted, "- .inf\n- -.inf\n- .nan\n- 2.5\n");
}

#[test]
fn test_floats_keep_their_kind() {
    let emitted = roundtrip("x: 2");
    assert_eq!(emitted, "x: 2\n");
    // An integral float must not be emitted as an integer.
    let emitted = roundtrip("x: 2.0");
    assert_eq!(emitted, "x: 2.0\n");
    assert!(deserialize(&emitted).unwrap()["x"].is_float());
}

#[test]
fn test_emit_quotes_ambiguous_strings() {
    let s = r#"
boolean: "true"
boolean2: "false"
integer: "4"
float: "2.6"
exp: "12e7"
nullable: "null"
nullable2: "~"
empty: ""
padded: " a "
colon: "a: b"
comment: "a # b"
flow: "[x, y]"
octal: "0o17"
"#;
    let original = deserialize(s).unwrap();
    let emitted = serialize(&original).unwrap();
    let reparsed = deserialize(&emitted).unwrap();
    assert_eq!(original, reparsed);
    for entry in reparsed.iter().unwrap() {
        assert!(entry.is_string(), "{:?} lost its kind", entry.value());
    }
}

#[test]
fn test_emit_quotes_ambiguous_keys() {
    // A key containing `: ` must be quoted to survive a round trip.
    let mut original = Node::mapping();
    original.insert(": deep", 1i64).unwrap();
    let emitted = serialize(&original).unwrap();
    let reparsed = deserialize(&emitted).unwrap();
    assert_eq!(original, reparsed);
    assert_eq!(reparsed[": deep"].as_integer().unwrap(), 1);
}

#[test]
fn test_emit_multiline_strings() {
    let emitted = roundtrip("a: \"line1\\nline2\"\nb: 'single line'");
    assert!(emitted.contains("\\n"), "{emitted}");
}

#[test]
fn test_emit_container_keys() {
    roundtrip("[1, 2]: seq key\n{a: b}: map key");
}

#[test]
fn test_emit_nested_sequences() {
    let emitted = roundtrip("- - 1\n  - 2\n- 3");
    assert_eq!(emitted, "-\n  - 1\n  - 2\n- 3\n");
}

#[test]
fn test_emit_preserves_anchors_and_tags() {
    let emitted = roundtrip("a: &x 1\nb: !!str 2\nc: *x");
    assert!(emitted.contains("&x"), "{emitted}");
    assert!(emitted.contains("!!str"), "{emitted}");

    let reparsed = deserialize(&emitted).unwrap();
    assert_eq!(reparsed["a"].anchor_name(), Some("x"));
    assert_eq!(reparsed["b"].tag_name(), Some("!!str"));
    // Alias topology is flattened into an independent copy.
    assert!(!reparsed["c"].is_alias());
    assert_eq!(reparsed["c"].as_integer().unwrap(), 1);
}

#[test]
fn test_emit_unicode_passthrough() {
    let emitted = roundtrip("a7: 你好");
    assert_eq!(emitted, "a7: 你好\n");
}

#[test]
fn test_round_trip_mixed_keys() {
    let original = deserialize("{true: [1, 2], null: {a: b}}").unwrap();
    let reparsed = deserialize(&serialize(&original).unwrap()).unwrap();
    assert_eq!(original, reparsed);
    assert_eq!(reparsed[Node::boolean(true)][0].as_integer().unwrap(), 1);
    assert_eq!(reparsed[Node::null()]["a"].as_str().unwrap(), "b");
}

#[test]
fn test_serialize_docs_joins_with_end_markers() {
    let docs = deserialize_docs("a: 1\n---\nb: 2").unwrap();
    let emitted = serialize_docs(&docs).unwrap();
    assert_eq!(emitted, "a: 1\n...\nb: 2\n");
    let reparsed = deserialize_docs(&emitted).unwrap();
    assert_eq!(docs, reparsed);
}

#[test]
fn test_mapping_order_is_preserved() {
    let emitted = roundtrip("z: 1\nm: 2\na: 3");
    assert_eq!(emitted, "z: 1\nm: 2\na: 3\n");
}
