//! Character-class predicates used throughout the scanner.

/// Check whether the character is the end-of-input sentinel (`\0`).
#[inline]
#[must_use]
pub fn is_z(c: char) -> bool {
    c == '\0'
}

/// Check whether the character is a line break (`\r` or `\n`).
#[inline]
#[must_use]
pub fn is_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

/// Check whether the character is a line break or the end sentinel.
#[inline]
#[must_use]
pub fn is_breakz(c: char) -> bool {
    is_break(c) || is_z(c)
}

/// Check whether the character is an inline whitespace (` ` or `\t`).
#[inline]
#[must_use]
pub fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Check whether the character is a whitespace, a line break or the end sentinel.
#[inline]
#[must_use]
pub fn is_blank_or_breakz(c: char) -> bool {
    is_blank(c) || is_breakz(c)
}

/// Check whether the character is an ascii digit.
#[inline]
#[must_use]
pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Check whether the character is a digit, letter, `_` or `-`.
#[inline]
#[must_use]
pub fn is_alpha(c: char) -> bool {
    matches!(c, '0'..='9' | 'a'..='z' | 'A'..='Z' | '_' | '-')
}

/// Check whether the character is a hexadecimal digit (case insensitive).
#[inline]
#[must_use]
pub fn is_hex(c: char) -> bool {
    c.is_ascii_hexdigit()
}

/// Convert a hexadecimal digit to its value.
///
/// # Panics
/// Panics if the character is not a hexadecimal digit.
#[inline]
#[must_use]
pub fn as_hex(c: char) -> u32 {
    c.to_digit(16).expect("not a hexadecimal digit")
}

/// Check whether the character is a YAML flow indicator (one of `,[]{}`).
#[inline]
#[must_use]
pub fn is_flow(c: char) -> bool {
    matches!(c, ',' | '[' | ']' | '{' | '}')
}

/// Check whether the character may appear in an anchor or alias name.
///
/// Anchor names exclude whitespace, line breaks and flow indicators.
#[inline]
#[must_use]
pub fn is_anchor_char(c: char) -> bool {
    !is_blank_or_breakz(c) && !is_flow(c) && c != '\u{FEFF}'
}

/// Check whether the character is a valid URI character.
#[inline]
#[must_use]
pub fn is_uri_char(c: char) -> bool {
    is_alpha(c) || "#;/?:@&=+$,.!~*'()[]%".contains(c)
}

/// Check whether the character is a valid tag-shorthand character.
///
/// Tag shorthands exclude the flow indicators and `!`, both of which end the
/// tag lexeme.
#[inline]
#[must_use]
pub fn is_tag_char(c: char) -> bool {
    is_uri_char(c) && !is_flow(c) && c != '!'
}

/// Check whether the character is a C0 control other than tab and line breaks.
///
/// Such characters may not appear literally inside any scalar style.
#[inline]
#[must_use]
pub fn is_forbidden_control(c: char) -> bool {
    matches!(c, '\x01'..='\x08' | '\x0b' | '\x0c' | '\x0e'..='\x1f')
}
