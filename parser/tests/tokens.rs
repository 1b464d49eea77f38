//! Integration tests for the token stream.

use citrine_parser::{BufferedInput, Scanner, StrInput, Token, TokenType, YamlVersion};

fn scan(source: &str) -> Vec<Token> {
    let mut scanner = Scanner::new(StrInput::new(source));
    let mut out = vec![];
    loop {
        let tok = scanner.next_token().expect("scan error");
        let done = tok.1 == TokenType::EndOfInput;
        out.push(tok);
        if done {
            return out;
        }
    }
}

#[test]
fn spans_point_into_the_source() {
    let tokens = scan("foo: bar\nbaz: 1\n");
    // `foo` sits at the very beginning.
    assert_eq!(tokens[0].0.start.line(), 1);
    assert_eq!(tokens[0].0.start.col(), 0);
    assert_eq!(tokens[0].0.end.col(), 3);
    // `bar` follows the separator.
    assert_eq!(tokens[2].0.start.col(), 5);
    // `baz` opens the second line.
    assert_eq!(tokens[3].0.start.line(), 2);
    assert_eq!(tokens[3].0.start.col(), 0);
}

#[test]
fn errors_carry_their_position() {
    let mut scanner = Scanner::new(StrInput::new("key: \"unterminated"));
    scanner.next_token().unwrap(); // key
    scanner.next_token().unwrap(); // :
    let err = scanner.next_token().unwrap_err();
    assert_eq!(err.marker().line(), 1);
    assert_eq!(err.marker().col(), 5);
    assert!(err.to_string().contains("line 1"));
}

#[test]
fn end_of_input_is_idempotent() {
    let mut scanner = Scanner::new(StrInput::new("a"));
    assert!(matches!(
        scanner.next_token().unwrap().1,
        TokenType::String(_)
    ));
    assert_eq!(scanner.next_token().unwrap().1, TokenType::EndOfInput);
    assert_eq!(scanner.next_token().unwrap().1, TokenType::EndOfInput);
}

#[test]
fn buffered_input_matches_str_input() {
    let source = "a: [1, &x yes, *x]\nb: |\n  text\n";
    let mut buffered = Scanner::new(BufferedInput::new(source.chars()));
    for expected in scan(source) {
        let got = buffered.next_token().expect("scan error");
        assert_eq!(got.1, expected.1);
    }
}

#[test]
fn version_switch_changes_boolean_spellings() {
    let mut scanner = Scanner::new(StrInput::new("yes"));
    scanner.set_version(YamlVersion::V1_1);
    assert_eq!(scanner.next_token().unwrap().1, TokenType::Boolean(true));

    let mut scanner = Scanner::new(StrInput::new("yes"));
    assert_eq!(
        scanner.next_token().unwrap().1,
        TokenType::String("yes".into())
    );
}

#[test]
fn scalar_text_side_channel_keeps_the_spelling() {
    let mut scanner = Scanner::new(StrInput::new("0o17"));
    assert_eq!(scanner.next_token().unwrap().1, TokenType::Integer(15));
    assert_eq!(scanner.scalar_text(), "0o17");
}

#[test]
fn tag_directive_lexemes() {
    let tokens = scan("%TAG !e! tag:example.com,2000:app/\n---\n!e!thing x\n");
    assert_eq!(
        tokens[0].1,
        TokenType::TagDirective("!e!".into(), "tag:example.com,2000:app/".into())
    );
    assert_eq!(tokens[1].1, TokenType::DocumentStart);
    assert_eq!(tokens[2].1, TokenType::Tag("!e!thing".into()));
}

#[test]
fn unknown_directives_are_not_fatal() {
    let tokens = scan("%WIDTH 80\nfoo\n");
    assert_eq!(tokens[0].1, TokenType::InvalidDirective);
    assert_eq!(tokens[1].1, TokenType::String("foo".into()));
}

#[test]
fn block_mapping_prefix_vs_key_separator() {
    let tokens = scan("a:\n  b: 1\n");
    assert_eq!(tokens[1].1, TokenType::BlockMappingPrefix);
    assert_eq!(tokens[3].1, TokenType::KeySeparator);
}

#[test]
fn explicit_key_tokens() {
    let tokens = scan("? key\n: value\n");
    assert_eq!(tokens[0].1, TokenType::ExplicitKey);
    assert_eq!(tokens[1].1, TokenType::String("key".into()));
    assert_eq!(tokens[2].1, TokenType::KeySeparator);
    assert_eq!(tokens[3].1, TokenType::String("value".into()));
}

#[test]
fn literal_control_characters_are_rejected() {
    let mut scanner = Scanner::new(StrInput::new("a: \x07bell"));
    scanner.next_token().unwrap();
    scanner.next_token().unwrap();
    assert!(scanner.next_token().is_err());

    let mut scanner = Scanner::new(StrInput::new("\"a\x01b\""));
    assert!(scanner.next_token().is_err());
}

#[test]
fn commas_outside_flow_context_are_rejected() {
    let mut scanner = Scanner::new(StrInput::new(", oops"));
    assert!(scanner.next_token().is_err());
}
