//! Home to the YAML scanner.
//!
//! The scanner is the lowest-level parsing utility. It reads input a
//! character at a time and emits tokens that the document builder composes
//! into a tree. Due to the grammar of YAML, the scanner has to keep some
//! context (flow nesting, the indent of the innermost block construct) and is
//! not error-free.

#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

use std::{error::Error, fmt};

use crate::{
    char_traits::{
        as_hex, is_anchor_char, is_blank_or_breakz, is_break, is_breakz, is_flow,
        is_forbidden_control, is_hex, is_tag_char, is_uri_char,
    },
    input::Input,
};

/// The YAML version in force while scanning.
///
/// The version alters how plain scalars are classified: YAML 1.1 recognizes
/// additional boolean spellings (`yes`, `no`, `on`, `off`).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum YamlVersion {
    /// YAML 1.1 semantics.
    V1_1,
    /// YAML 1.2 semantics (core schema).
    #[default]
    V1_2,
}

/// A location in a YAML document.
#[derive(Clone, Copy, PartialEq, Debug, Eq, Default)]
pub struct Marker {
    /// The index (in characters) in the input.
    index: usize,
    /// The line (1-indexed).
    line: usize,
    /// The column (0-indexed).
    col: usize,
}

impl Marker {
    /// Create a new [`Marker`] at the given position.
    #[must_use]
    pub fn new(index: usize, line: usize, col: usize) -> Marker {
        Marker { index, line, col }
    }

    /// Return the character index of the marker in the source.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Return the line of the marker in the source.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Return the column of the marker in the source.
    #[must_use]
    pub fn col(&self) -> usize {
        self.col
    }
}

/// A range of locations in a YAML document.
#[derive(Clone, Copy, PartialEq, Debug, Eq, Default)]
pub struct Span {
    /// The start (inclusive) of the range.
    pub start: Marker,
    /// The end (exclusive) of the range.
    pub end: Marker,
}

impl Span {
    /// Create a new [`Span`] for the given range.
    #[must_use]
    pub fn new(start: Marker, end: Marker) -> Span {
        Span { start, end }
    }

    /// Create an empty [`Span`] at a given location.
    #[must_use]
    pub fn empty(mark: Marker) -> Span {
        Span {
            start: mark,
            end: mark,
        }
    }
}

/// An error that occurred while scanning.
#[derive(Clone, PartialEq, Debug, Eq)]
pub struct ScanError {
    /// The position at which the error happened in the source.
    mark: Marker,
    /// Human-readable details about the error.
    info: String,
}

impl ScanError {
    /// Create a new error from a location and an error string.
    #[must_use]
    pub fn new(loc: Marker, info: String) -> ScanError {
        ScanError { mark: loc, info }
    }

    /// Convenience alias for string slices.
    #[must_use]
    pub fn new_str(loc: Marker, info: &str) -> ScanError {
        ScanError {
            mark: loc,
            info: info.to_owned(),
        }
    }

    /// Return the marker pointing to the error in the source.
    #[must_use]
    pub fn marker(&self) -> &Marker {
        &self.mark
    }

    /// Return the information string describing the error that happened.
    #[must_use]
    pub fn info(&self) -> &str {
        self.info.as_ref()
    }
}

impl Error for ScanError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(
            formatter,
            "{} at line {} column {}",
            self.info,
            self.mark.line,
            self.mark.col + 1,
        )
    }
}

/// The contents of a scanner token.
#[derive(Clone, PartialEq, Debug)]
pub enum TokenType {
    /// The end of the input. Returned from then on once reached.
    EndOfInput,
    /// The start of a YAML document (`---`).
    DocumentStart,
    /// The end of a YAML document (`...`).
    DocumentEnd,
    /// A `:` separating a key from its value on the same line.
    KeySeparator,
    /// A `,` separating two entries of a flow collection.
    ValueSeparator,
    /// A `- ` introducing an entry of a block sequence.
    BlockSequenceEntry,
    /// The `[` opening a flow sequence.
    FlowSequenceBegin,
    /// The `]` closing a flow sequence.
    FlowSequenceEnd,
    /// The `{` opening a flow mapping.
    FlowMappingBegin,
    /// The `}` closing a flow mapping.
    FlowMappingEnd,
    /// A `?` introducing an explicit key.
    ExplicitKey,
    /// A `:` that terminates its line, announcing a nested block value.
    BlockMappingPrefix,
    /// An anchor property (`&name`).
    Anchor(String),
    /// An alias reference (`*name`).
    Alias(String),
    /// A tag property, captured exactly as it appeared in the source.
    Tag(String),
    /// A `%YAML` directive with its major and minor version numbers.
    YamlDirective(u32, u32),
    /// A `%TAG` directive with its handle and prefix.
    TagDirective(String, String),
    /// A directive the scanner does not know. Whitespace-equivalent.
    InvalidDirective,
    /// A `#` comment, consumed to the end of the line. Whitespace-equivalent.
    Comment,
    /// A plain scalar holding a null value.
    Null,
    /// A plain scalar holding a boolean value.
    Boolean(bool),
    /// A plain scalar holding an integer value.
    Integer(i64),
    /// A plain scalar holding a floating-point value.
    Float(f64),
    /// A scalar holding a string, after escape processing and folding.
    String(String),
}

/// A scanner token, along with its position in the source.
#[derive(Clone, PartialEq, Debug)]
pub struct Token(pub Span, pub TokenType);

/// A convenience alias for scanner functions that may fail without returning a value.
pub type ScanResult = Result<(), ScanError>;

/// The YAML scanner.
///
/// This corresponds to the low-level interface when reading YAML. Tokens are
/// pulled one at a time with [`Scanner::next_token`]. The scanner understands
/// indentation and whitespace well enough to delimit scalars, but structural
/// validation (indentation monotonicity, balanced flow collections) is the
/// document builder's job.
#[derive(Debug)]
pub struct Scanner<T> {
    /// The input source.
    input: T,
    /// The position of the cursor within the input.
    mark: Marker,
    /// The YAML version in force, affecting plain-scalar classification.
    version: YamlVersion,
    /// Level of nesting of flow collections.
    flow_level: u32,
    /// Column of the innermost block indicator (`-`, `?` or a key).
    ///
    /// Continuation lines of multi-line scalars must be indented further than
    /// this column. `-1` before any indicator has been seen.
    parent_indent: isize,
    /// Start of the most recently emitted token.
    last_token_start: Marker,
    /// Whether the previous token may be adjacent to a `:` (quoted scalars
    /// and closing flow brackets, for JSON compatibility).
    adjacent_key_allowed: bool,
    /// The raw text of the most recent scalar token.
    scalar_text: String,
    /// Whether [`TokenType::EndOfInput`] has been reached.
    ended: bool,
}

/// Chomping, how final line breaks and trailing empty lines are interpreted.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Chomping {
    /// The final line break and any trailing empty lines are excluded.
    Strip,
    /// The final line break is preserved, but trailing empty lines are excluded.
    Clip,
    /// The final line break and trailing empty lines are included.
    Keep,
}

impl<T: Input> Scanner<T> {
    /// Create the YAML tokenizer over the given input.
    pub fn new(input: T) -> Self {
        Scanner {
            input,
            mark: Marker::new(0, 1, 0),
            version: YamlVersion::default(),
            flow_level: 0,
            parent_indent: -1,
            last_token_start: Marker::new(0, 1, 0),
            adjacent_key_allowed: false,
            scalar_text: String::new(),
            ended: false,
        }
    }

    /// Get the current position in the input.
    #[inline]
    #[must_use]
    pub fn mark(&self) -> Marker {
        self.mark
    }

    /// Set the YAML version used when classifying plain scalars.
    ///
    /// The builder calls this when it encounters a `%YAML` directive.
    pub fn set_version(&mut self, version: YamlVersion) {
        self.version = version;
    }

    /// Return the raw text of the most recent scalar token.
    ///
    /// For plain scalars this is the folded text before classification, which
    /// the builder needs when a tag forces a different interpretation.
    #[must_use]
    pub fn scalar_text(&self) -> &str {
        &self.scalar_text
    }

    /// Return the next token in the stream.
    ///
    /// Once the end of input has been reached, every subsequent call returns
    /// [`TokenType::EndOfInput`] again.
    ///
    /// # Errors
    /// Returns `ScanError` when the input is not lexically valid YAML.
    pub fn next_token(&mut self) -> Result<Token, ScanError> {
        if self.ended {
            return Ok(Token(Span::empty(self.mark), TokenType::EndOfInput));
        }

        if let Some(span) = self.skip_to_next_token()? {
            return Ok(Token(span, TokenType::Comment));
        }

        let tok = self.fetch_token()?;
        debug_print!("\u{21B3} {:?} {:?}", tok.1, tok.0);
        self.last_token_start = tok.0.start;
        if tok.1 == TokenType::EndOfInput {
            self.ended = true;
        }
        Ok(tok)
    }

    /// Dispatch on the character under the cursor.
    fn fetch_token(&mut self) -> Result<Token, ScanError> {
        self.input.lookahead(4);
        let start = self.mark;
        let adjacent = self.adjacent_key_allowed;
        self.adjacent_key_allowed = false;

        if self.input.next_is_z() {
            return Ok(Token(Span::empty(start), TokenType::EndOfInput));
        }

        if self.mark.col == 0 {
            if self.input.next_char_is('%') {
                return self.scan_directive();
            }
            if self.input.next_is_document_start() {
                self.parent_indent = -1;
                self.skip_n_chars(3);
                return Ok(Token(Span::new(start, self.mark), TokenType::DocumentStart));
            }
            if self.input.next_is_document_end() {
                self.parent_indent = -1;
                self.skip_n_chars(3);
                return Ok(Token(Span::new(start, self.mark), TokenType::DocumentEnd));
            }
        }

        let c = self.input.peek();
        let nc = self.input.peek_nth(1);
        match c {
            '[' => {
                self.flow_level = self.flow_level.checked_add(1).ok_or_else(|| {
                    ScanError::new_str(start, "recursion limit exceeded in flow collection")
                })?;
                self.skip_char();
                Ok(Token(
                    Span::new(start, self.mark),
                    TokenType::FlowSequenceBegin,
                ))
            }
            '{' => {
                self.flow_level = self.flow_level.checked_add(1).ok_or_else(|| {
                    ScanError::new_str(start, "recursion limit exceeded in flow collection")
                })?;
                self.skip_char();
                Ok(Token(
                    Span::new(start, self.mark),
                    TokenType::FlowMappingBegin,
                ))
            }
            ']' => {
                self.flow_level = self.flow_level.saturating_sub(1);
                self.adjacent_key_allowed = true;
                self.skip_char();
                Ok(Token(Span::new(start, self.mark), TokenType::FlowSequenceEnd))
            }
            '}' => {
                self.flow_level = self.flow_level.saturating_sub(1);
                self.adjacent_key_allowed = true;
                self.skip_char();
                Ok(Token(Span::new(start, self.mark), TokenType::FlowMappingEnd))
            }
            ',' => {
                if self.flow_level == 0 {
                    return Err(ScanError::new_str(
                        start,
                        "',' is only valid inside a flow collection",
                    ));
                }
                self.skip_char();
                Ok(Token(Span::new(start, self.mark), TokenType::ValueSeparator))
            }
            '-' if is_blank_or_breakz(nc) && self.flow_level == 0 => {
                self.parent_indent = start.col as isize;
                self.skip_char();
                Ok(Token(
                    Span::new(start, self.mark),
                    TokenType::BlockSequenceEntry,
                ))
            }
            '-' if is_blank_or_breakz(nc) => Err(ScanError::new_str(
                start,
                r#""-" is only valid inside a block"#,
            )),
            '?' if is_blank_or_breakz(nc) => {
                if self.flow_level == 0 {
                    self.parent_indent = start.col as isize;
                }
                self.skip_char();
                Ok(Token(Span::new(start, self.mark), TokenType::ExplicitKey))
            }
            ':' if is_breakz(nc) && self.flow_level == 0 => {
                self.parent_indent = self.last_token_start.col as isize;
                self.skip_char();
                Ok(Token(
                    Span::new(start, self.mark),
                    TokenType::BlockMappingPrefix,
                ))
            }
            ':' if is_blank_or_breakz(nc) || (self.flow_level > 0 && is_flow(nc)) || adjacent =>
            {
                if self.flow_level == 0 {
                    self.parent_indent = self.last_token_start.col as isize;
                }
                self.skip_char();
                Ok(Token(Span::new(start, self.mark), TokenType::KeySeparator))
            }
            '&' => self.scan_anchor(false),
            '*' => self.scan_anchor(true),
            '!' => self.scan_tag(),
            '|' if self.flow_level == 0 => self.scan_block_scalar(true),
            '>' if self.flow_level == 0 => self.scan_block_scalar(false),
            '\'' => self.scan_quoted_scalar(true),
            '"' => self.scan_quoted_scalar(false),
            '%' | '@' | '`' => Err(ScanError::new(
                start,
                format!("unexpected character: `{c}'"),
            )),
            _ => self.scan_plain_scalar(),
        }
    }

    /// Skip over whitespace and line breaks until the next token.
    ///
    /// Comments are consumed to the end of their line; a [`Span`] is returned
    /// so that the caller can emit a [`TokenType::Comment`].
    fn skip_to_next_token(&mut self) -> Result<Option<Span>, ScanError> {
        loop {
            match self.input.look_ch() {
                ' ' | '\t' => self.skip_char(),
                '\n' | '\r' => {
                    self.input.lookahead(2);
                    self.skip_linebreak();
                }
                '#' => {
                    let start = self.mark;
                    while !self.input.next_is_breakz() {
                        self.skip_char();
                        self.input.lookahead(1);
                    }
                    return Ok(Some(Span::new(start, self.mark)));
                }
                _ => return Ok(None),
            }
        }
    }

    /// Consume the next character. It must not be a line break.
    #[inline]
    fn skip_char(&mut self) {
        self.input.skip();
        self.mark.index += 1;
        self.mark.col += 1;
    }

    /// Consume the next `count` characters. None may be a line break.
    #[inline]
    fn skip_n_chars(&mut self, count: usize) {
        self.input.skip_n(count);
        self.mark.index += count;
        self.mark.col += count;
    }

    /// Consume the next character. It must be a line break (`\r` or `\n`).
    #[inline]
    fn skip_nl(&mut self) {
        self.input.skip();
        self.mark.index += 1;
        self.mark.col = 0;
        self.mark.line += 1;
    }

    /// Consume a line break (CR, LF or CRLF), if any.
    ///
    /// A prior lookahead of 2 must have been made.
    #[inline]
    fn skip_linebreak(&mut self) {
        if self.input.next_char_is('\r') && self.input.nth_char_is(1, '\n') {
            self.skip_char();
        }
        if self.input.next_is_break() {
            self.skip_nl();
        }
    }

    /// Read and consume a line break, pushing a `\n` into `s`.
    #[inline]
    fn read_break(&mut self, s: &mut String) {
        debug_assert!(self.input.next_is_break());
        self.input.lookahead(2);
        self.skip_linebreak();
        s.push('\n');
    }

    /// Skip inline whitespace and an optional trailing comment, then require
    /// the end of the line.
    fn require_eol(&mut self, what: &str) -> ScanResult {
        loop {
            match self.input.look_ch() {
                ' ' | '\t' => self.skip_char(),
                '#' => {
                    while !self.input.next_is_breakz() {
                        self.skip_char();
                        self.input.lookahead(1);
                    }
                }
                c if is_breakz(c) => return Ok(()),
                _ => {
                    return Err(ScanError::new(
                        self.mark,
                        format!("while scanning {what}, did not find expected comment or line break"),
                    ))
                }
            }
        }
    }

    // ---------------------------------------------------------------------
    // Directives.

    /// Scan a `%YAML`, `%TAG` or unknown directive. The cursor is on the `%`.
    fn scan_directive(&mut self) -> Result<Token, ScanError> {
        let start = self.mark;
        self.skip_char();

        let mut name = String::new();
        while crate::char_traits::is_alpha(self.input.look_ch()) {
            name.push(self.input.peek());
            self.skip_char();
        }

        let tok = match name.as_str() {
            "YAML" => self.scan_yaml_directive(start)?,
            "TAG" => self.scan_tag_directive(start)?,
            _ => {
                // Reserved directive. Skip the rest of the line; the builder
                // treats it as a warning.
                self.input.lookahead(1);
                while !self.input.next_is_breakz() {
                    self.skip_char();
                    self.input.lookahead(1);
                }
                return Ok(Token(
                    Span::new(start, self.mark),
                    TokenType::InvalidDirective,
                ));
            }
        };

        self.require_eol("a directive")?;
        Ok(tok)
    }

    fn scan_yaml_directive(&mut self, start: Marker) -> Result<Token, ScanError> {
        self.skip_directive_blanks(start)?;

        let major = self.scan_version_number(start)?;
        if self.input.look_ch() != '.' {
            return Err(ScanError::new_str(
                start,
                "while scanning a YAML directive, did not find expected digit or '.' character",
            ));
        }
        self.skip_char();
        let minor = self.scan_version_number(start)?;

        Ok(Token(
            Span::new(start, self.mark),
            TokenType::YamlDirective(major, minor),
        ))
    }

    fn scan_version_number(&mut self, start: Marker) -> Result<u32, ScanError> {
        let mut val = 0u32;
        let mut length = 0usize;
        while let Some(digit) = self.input.look_ch().to_digit(10) {
            if length >= 9 {
                return Err(ScanError::new_str(
                    start,
                    "while scanning a YAML directive, found extremely long version number",
                ));
            }
            length += 1;
            val = val * 10 + digit;
            self.skip_char();
        }
        if length == 0 {
            return Err(ScanError::new_str(
                start,
                "while scanning a YAML directive, did not find expected version number",
            ));
        }
        Ok(val)
    }

    fn scan_tag_directive(&mut self, start: Marker) -> Result<Token, ScanError> {
        self.skip_directive_blanks(start)?;

        // The handle: a '!', optional word characters, optional closing '!'.
        let mut handle = String::new();
        if self.input.look_ch() != '!' {
            return Err(ScanError::new_str(
                start,
                "while scanning a TAG directive, did not find expected '!'",
            ));
        }
        handle.push('!');
        self.skip_char();
        while crate::char_traits::is_alpha(self.input.look_ch()) {
            handle.push(self.input.peek());
            self.skip_char();
        }
        if self.input.look_ch() == '!' {
            handle.push('!');
            self.skip_char();
        } else if handle != "!" {
            return Err(ScanError::new_str(
                start,
                "while scanning a TAG directive, did not find expected '!'",
            ));
        }

        self.skip_directive_blanks(start)?;

        // The prefix: URI characters, with %-escapes validated and decoded.
        let mut prefix = String::new();
        while is_uri_char(self.input.look_ch()) {
            if self.input.peek() == '%' {
                prefix.push(self.scan_uri_escape(start)?);
            } else {
                prefix.push(self.input.peek());
                self.skip_char();
            }
        }
        if prefix.is_empty() {
            return Err(ScanError::new_str(
                start,
                "while scanning a TAG directive, did not find expected tag prefix",
            ));
        }

        Ok(Token(
            Span::new(start, self.mark),
            TokenType::TagDirective(handle, prefix),
        ))
    }

    fn skip_directive_blanks(&mut self, start: Marker) -> ScanResult {
        if !self.input.look_ch().is_ascii_whitespace() || self.input.next_is_breakz() {
            return Err(ScanError::new_str(
                start,
                "while scanning a directive, did not find expected whitespace",
            ));
        }
        while self.input.next_is_blank() {
            self.skip_char();
            self.input.lookahead(1);
        }
        Ok(())
    }

    /// Decode a `%HH`-escaped UTF-8 sequence into a character.
    ///
    /// The cursor is on the `%`. Multi-byte sequences must be complete; a
    /// prefix that stops mid-sequence is rejected.
    fn scan_uri_escape(&mut self, start: Marker) -> Result<char, ScanError> {
        let mut width = 0usize;
        let mut code = 0u32;
        loop {
            self.input.lookahead(3);
            let c = self.input.peek_nth(1);
            let nc = self.input.peek_nth(2);
            if !(self.input.next_char_is('%') && is_hex(c) && is_hex(nc)) {
                return Err(ScanError::new_str(
                    start,
                    "while scanning a tag, found an invalid escape sequence",
                ));
            }
            let byte = (as_hex(c) << 4) + as_hex(nc);
            if width == 0 {
                width = match byte {
                    _ if byte & 0x80 == 0x00 => 1,
                    _ if byte & 0xE0 == 0xC0 => 2,
                    _ if byte & 0xF0 == 0xE0 => 3,
                    _ if byte & 0xF8 == 0xF0 => 4,
                    _ => {
                        return Err(ScanError::new_str(
                            start,
                            "while scanning a tag, found an incorrect leading UTF-8 byte",
                        ));
                    }
                };
                code = match width {
                    1 => byte,
                    2 => byte & 0x1F,
                    3 => byte & 0x0F,
                    _ => byte & 0x07,
                };
            } else {
                if byte & 0xC0 != 0x80 {
                    return Err(ScanError::new_str(
                        start,
                        "while scanning a tag, found an incorrect trailing UTF-8 byte",
                    ));
                }
                code = (code << 6) + (byte & 0x3F);
            }
            self.skip_n_chars(3);
            width -= 1;
            if width == 0 {
                break;
            }
        }

        char::from_u32(code).ok_or_else(|| {
            ScanError::new_str(start, "while scanning a tag, found an invalid UTF-8 codepoint")
        })
    }

    // ---------------------------------------------------------------------
    // Anchors, aliases and tags.

    /// Scan an anchor (`&name`) or alias (`*name`).
    fn scan_anchor(&mut self, alias: bool) -> Result<Token, ScanError> {
        let start = self.mark;
        self.skip_char();

        let mut name = String::new();
        while is_anchor_char(self.input.look_ch()) {
            name.push(self.input.peek());
            self.skip_char();
        }
        if name.is_empty() {
            return Err(ScanError::new_str(
                start,
                "while scanning an anchor or alias, did not find expected name character",
            ));
        }

        let tok = if alias {
            TokenType::Alias(name)
        } else {
            TokenType::Anchor(name)
        };
        Ok(Token(Span::new(start, self.mark), tok))
    }

    /// Scan a tag property, keeping the source spelling.
    ///
    /// Recognized forms are the non-specific `!`, the verbatim `!<uri>`, and
    /// the `!suffix` / `!!suffix` / `!handle!suffix` shorthands. `%`-escapes
    /// are validated but left encoded, since the payload is the source text.
    fn scan_tag(&mut self) -> Result<Token, ScanError> {
        let start = self.mark;
        let mut text = String::from("!");
        self.skip_char();

        if self.input.look_ch() == '<' {
            text.push('<');
            self.skip_char();
            while is_uri_char(self.input.look_ch()) {
                if self.input.peek() == '%' {
                    self.check_uri_escape_digits(start)?;
                    text.push('%');
                    text.push(self.input.peek_nth(1));
                    text.push(self.input.peek_nth(2));
                    self.skip_n_chars(3);
                } else {
                    text.push(self.input.peek());
                    self.skip_char();
                }
            }
            if self.input.look_ch() != '>' {
                return Err(ScanError::new_str(
                    start,
                    "while scanning a verbatim tag, did not find the expected '>'",
                ));
            }
            text.push('>');
            self.skip_char();
        } else {
            // Shorthand. At most one interior '!' (closing a named handle).
            let mut bangs = 0u32;
            loop {
                let c = self.input.look_ch();
                if c == '!' {
                    bangs += 1;
                    if bangs > 1 {
                        return Err(ScanError::new_str(
                            start,
                            "while scanning a tag, found an unexpected '!'",
                        ));
                    }
                    text.push('!');
                    self.skip_char();
                } else if c == '%' {
                    self.check_uri_escape_digits(start)?;
                    text.push('%');
                    text.push(self.input.peek_nth(1));
                    text.push(self.input.peek_nth(2));
                    self.skip_n_chars(3);
                } else if is_tag_char(c) {
                    text.push(c);
                    self.skip_char();
                } else {
                    break;
                }
            }
        }

        let c = self.input.look_ch();
        if is_blank_or_breakz(c) || (self.flow_level > 0 && is_flow(c)) {
            Ok(Token(Span::new(start, self.mark), TokenType::Tag(text)))
        } else {
            Err(ScanError::new_str(
                start,
                "while scanning a tag, did not find expected whitespace or line break",
            ))
        }
    }

    /// Require two hexadecimal digits after a `%` in a tag lexeme.
    fn check_uri_escape_digits(&mut self, start: Marker) -> ScanResult {
        self.input.lookahead(3);
        if !(is_hex(self.input.peek_nth(1)) && is_hex(self.input.peek_nth(2))) {
            return Err(ScanError::new_str(
                start,
                "while scanning a tag, found an invalid escape sequence",
            ));
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Scalars.

    /// Scan a plain (unquoted) scalar and classify it against the schema.
    fn scan_plain_scalar(&mut self) -> Result<Token, ScanError> {
        let start = self.mark;
        let mut string = String::with_capacity(32);
        let mut whitespaces = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();
        let mut after_break = false;
        let mut end_mark = self.mark;

        'scalar: loop {
            // Consume the content characters of the current line.
            self.input.lookahead(4);
            if self.mark.col == 0 && self.input.next_is_document_indicator() {
                break;
            }
            if after_break && self.input.next_char_is('#') {
                // A comment line; the scalar cannot resume after it.
                break;
            }

            loop {
                self.input.lookahead(2);
                let c = self.input.peek();
                if is_blank_or_breakz(c) {
                    break;
                }
                let nc = self.input.peek_nth(1);
                if c == ':'
                    && (is_blank_or_breakz(nc) || (self.flow_level > 0 && is_flow(nc)))
                {
                    break 'scalar;
                }
                if self.flow_level > 0 && is_flow(c) {
                    break 'scalar;
                }
                if c == '#' && (!whitespaces.is_empty() || after_break) {
                    break 'scalar;
                }
                if is_forbidden_control(c) {
                    return Err(ScanError::new_str(
                        self.mark,
                        "control characters are not allowed in a scalar",
                    ));
                }

                // Fold the whitespace that precedes this content character.
                if after_break {
                    if trailing_breaks.is_empty() {
                        string.push(' ');
                    } else {
                        string.push_str(&trailing_breaks);
                        trailing_breaks.clear();
                    }
                    leading_break.clear();
                    after_break = false;
                } else if !whitespaces.is_empty() {
                    string.push_str(&whitespaces);
                    whitespaces.clear();
                }

                string.push(c);
                self.skip_char();
                end_mark = self.mark;
            }

            if !(self.input.next_is_blank() || self.input.next_is_break()) {
                // End of input, or a character that terminates the scalar.
                break;
            }

            // Consume inline whitespace and line breaks.
            self.input.lookahead(2);
            while self.input.next_is_blank() || self.input.next_is_break() {
                if self.input.next_is_blank() {
                    if after_break {
                        // Leading whitespace of a continuation line.
                        self.skip_char();
                    } else {
                        whitespaces.push(self.input.peek());
                        self.skip_char();
                    }
                } else if after_break {
                    self.read_break(&mut trailing_breaks);
                } else {
                    whitespaces.clear();
                    self.read_break(&mut leading_break);
                    after_break = true;
                }
                self.input.lookahead(2);
            }

            if !after_break {
                // Inline whitespace only: loop around for more content.
                continue;
            }

            // A continuation line must be indented past the innermost block
            // indicator; in flow context indentation carries no meaning.
            if self.flow_level == 0 && (self.mark.col as isize) <= self.parent_indent {
                break;
            }
            if self.input.next_is_z() {
                break;
            }
        }

        if string.is_empty() {
            return Err(ScanError::new_str(start, "unexpected end of plain scalar"));
        }

        self.scalar_text.clear();
        self.scalar_text.push_str(&string);
        let token = self.classify_plain(string);
        Ok(Token(Span::new(start, end_mark), token))
    }

    /// Classify the text of a plain scalar against the schema in force.
    ///
    /// Every plain scalar resolves to exactly one of null, boolean, integer,
    /// float or string.
    fn classify_plain(&self, text: String) -> TokenType {
        match text.as_str() {
            "~" | "null" | "Null" | "NULL" => return TokenType::Null,
            "true" | "True" | "TRUE" => return TokenType::Boolean(true),
            "false" | "False" | "FALSE" => return TokenType::Boolean(false),
            _ => {}
        }
        if self.version == YamlVersion::V1_1 {
            match text.as_str() {
                "yes" | "Yes" | "YES" | "on" | "On" | "ON" => return TokenType::Boolean(true),
                "no" | "No" | "NO" | "off" | "Off" | "OFF" => return TokenType::Boolean(false),
                _ => {}
            }
        }

        if let Some(digits) = text.strip_prefix("0x") {
            if let Ok(i) = i64::from_str_radix(digits, 16) {
                return TokenType::Integer(i);
            }
        } else if let Some(digits) = text.strip_prefix("0o") {
            if let Ok(i) = i64::from_str_radix(digits, 8) {
                return TokenType::Integer(i);
            }
        } else if let Ok(i) = text.parse::<i64>() {
            return TokenType::Integer(i);
        }

        if let Some(f) = parse_core_schema_float(&text) {
            return TokenType::Float(f);
        }

        TokenType::String(text)
    }

    /// Scan a single- or double-quoted scalar.
    fn scan_quoted_scalar(&mut self, single: bool) -> Result<Token, ScanError> {
        let start = self.mark;
        let mut string = String::new();
        let mut whitespaces = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();
        let mut after_break;

        // Eat the left quote.
        self.skip_char();

        loop {
            self.input.lookahead(4);
            if self.mark.col == 0 && self.input.next_is_document_indicator() {
                return Err(ScanError::new_str(
                    start,
                    "while scanning a quoted scalar, found unexpected document indicator",
                ));
            }
            if self.input.next_is_z() {
                return Err(ScanError::new_str(
                    start,
                    "while scanning a quoted scalar, found unexpected end of stream",
                ));
            }

            after_break = false;
            self.consume_quoted_content(single, &mut string, &mut after_break, start)?;

            match self.input.look_ch() {
                '\'' if single => break,
                '"' if !single => break,
                _ => {}
            }

            // Consume blank characters and line breaks.
            self.input.lookahead(2);
            while self.input.next_is_blank() || self.input.next_is_break() {
                if self.input.next_is_blank() {
                    if after_break {
                        self.skip_char();
                    } else {
                        whitespaces.push(self.input.peek());
                        self.skip_char();
                    }
                } else if after_break {
                    self.read_break(&mut trailing_breaks);
                } else {
                    whitespaces.clear();
                    self.read_break(&mut leading_break);
                    after_break = true;
                }
                self.input.lookahead(2);
            }

            // Join whitespace or fold the line breaks. An escaped line break
            // leaves `leading_break` empty and folds to nothing.
            if after_break {
                if leading_break.is_empty() {
                    string.push_str(&trailing_breaks);
                } else if trailing_breaks.is_empty() {
                    string.push(' ');
                } else {
                    string.push_str(&trailing_breaks);
                }
                trailing_breaks.clear();
                leading_break.clear();
            } else {
                string.push_str(&whitespaces);
                whitespaces.clear();
            }
        }

        // Eat the right quote.
        self.skip_char();
        self.adjacent_key_allowed = true;

        self.scalar_text.clear();
        self.scalar_text.push_str(&string);
        Ok(Token(Span::new(start, self.mark), TokenType::String(string)))
    }

    /// Consume successive non-whitespace characters from a quoted scalar,
    /// resolving escape sequences.
    fn consume_quoted_content(
        &mut self,
        single: bool,
        string: &mut String,
        after_break: &mut bool,
        start: Marker,
    ) -> ScanResult {
        self.input.lookahead(2);
        while !is_blank_or_breakz(self.input.peek()) {
            match self.input.peek() {
                // An escaped single quote.
                '\'' if single && self.input.nth_char_is(1, '\'') => {
                    string.push('\'');
                    self.skip_n_chars(2);
                }
                // The closing quote.
                '\'' if single => break,
                '"' if !single => break,
                // An escaped line break: swallows the break and the
                // surrounding whitespace.
                '\\' if !single && is_break(self.input.peek_nth(1)) => {
                    self.input.lookahead(3);
                    self.skip_char();
                    self.skip_linebreak();
                    *after_break = true;
                    break;
                }
                // An escape sequence.
                '\\' if !single => {
                    string.push(self.resolve_escape_sequence(start)?);
                }
                c if is_forbidden_control(c) => {
                    return Err(ScanError::new_str(
                        self.mark,
                        "control characters are not allowed in a scalar",
                    ));
                }
                c => {
                    string.push(c);
                    self.skip_char();
                }
            }
            self.input.lookahead(2);
        }
        Ok(())
    }

    /// Resolve the escape sequence under the cursor.
    ///
    /// The cursor is on the `\` starting the escape.
    fn resolve_escape_sequence(&mut self, start: Marker) -> Result<char, ScanError> {
        let mut code_length = 0usize;
        let mut ret = '\0';

        match self.input.peek_nth(1) {
            '0' => ret = '\0',
            'a' => ret = '\x07',
            'b' => ret = '\x08',
            't' | '\t' => ret = '\t',
            'n' => ret = '\n',
            'v' => ret = '\x0b',
            'f' => ret = '\x0c',
            'r' => ret = '\x0d',
            'e' => ret = '\x1b',
            ' ' => ret = '\x20',
            '"' => ret = '"',
            '/' => ret = '/',
            '\\' => ret = '\\',
            // Unicode next line (#x85).
            'N' => ret = '\u{85}',
            // Unicode non-breaking space (#xA0).
            '_' => ret = '\u{A0}',
            // Unicode line separator (#x2028).
            'L' => ret = '\u{2028}',
            // Unicode paragraph separator (#x2029).
            'P' => ret = '\u{2029}',
            'x' => code_length = 2,
            'u' => code_length = 4,
            'U' => code_length = 8,
            _ => {
                return Err(ScanError::new_str(
                    start,
                    "while parsing a quoted scalar, found unknown escape character",
                ))
            }
        }
        self.skip_n_chars(2);

        if code_length > 0 {
            self.input.lookahead(code_length);
            let mut value = 0u32;
            for i in 0..code_length {
                let c = self.input.peek_nth(i);
                if !is_hex(c) {
                    return Err(ScanError::new_str(
                        start,
                        "while parsing a quoted scalar, did not find expected hexadecimal number",
                    ));
                }
                value = (value << 4) + as_hex(c);
            }
            let Some(ch) = char::from_u32(value) else {
                return Err(ScanError::new_str(
                    start,
                    "while parsing a quoted scalar, found invalid Unicode character escape code",
                ));
            };
            ret = ch;
            self.skip_n_chars(code_length);
        }
        Ok(ret)
    }

    /// Scan a literal (`|`) or folded (`>`) block scalar.
    #[allow(clippy::too_many_lines)]
    fn scan_block_scalar(&mut self, literal: bool) -> Result<Token, ScanError> {
        let start = self.mark;
        let mut chomping = Chomping::Clip;
        let mut increment: usize = 0;

        // Skip the '|' or '>'.
        self.skip_char();

        // The chomping indicator and the indentation indicator may appear in
        // either order.
        self.input.lookahead(2);
        if self.input.next_char_is('+') || self.input.next_char_is('-') {
            chomping = if self.input.next_char_is('+') {
                Chomping::Keep
            } else {
                Chomping::Strip
            };
            self.skip_char();
            if self.input.look_ch().is_ascii_digit() {
                increment = self.scan_indentation_indicator(start)?;
            }
        } else if self.input.next_char_is('0') {
            return Err(ScanError::new_str(
                start,
                "while scanning a block scalar, found an indentation indicator equal to 0",
            ));
        } else if self.input.peek().is_ascii_digit() {
            increment = self.scan_indentation_indicator(start)?;
            self.input.lookahead(1);
            if self.input.next_char_is('+') || self.input.next_char_is('-') {
                chomping = if self.input.next_char_is('+') {
                    Chomping::Keep
                } else {
                    Chomping::Strip
                };
                self.skip_char();
            }
        }

        // The rest of the header line must be empty (or a comment).
        self.require_eol("a block scalar")?;

        let mut chomping_break = String::new();
        if self.input.next_is_break() {
            self.read_break(&mut chomping_break);
        }

        // Establish the content indentation.
        let base = if self.parent_indent < 0 {
            0
        } else {
            self.parent_indent as usize
        };
        let mut indent = 0;
        let mut trailing_breaks = String::new();
        if increment > 0 {
            indent = base + increment;
            self.skip_block_scalar_indent(indent, &mut trailing_breaks);
        } else {
            self.detect_block_scalar_indent(&mut indent, &mut trailing_breaks);
        }

        // End of stream with no content.
        if self.input.next_is_z() {
            let contents = match chomping {
                Chomping::Strip => String::new(),
                _ if self.mark.line == start.line() => String::new(),
                Chomping::Clip => chomping_break,
                Chomping::Keep if trailing_breaks.is_empty() => chomping_break,
                Chomping::Keep => trailing_breaks,
            };
            self.scalar_text.clear();
            self.scalar_text.push_str(&contents);
            return Ok(Token(Span::new(start, self.mark), TokenType::String(contents)));
        }

        if self.mark.col < indent && (self.mark.col as isize) > self.parent_indent {
            return Err(ScanError::new_str(
                self.mark,
                "wrongly indented line in block scalar",
            ));
        }

        let mut string = String::new();
        let mut leading_break = String::new();
        let mut leading_blank = false;

        while self.mark.col == indent && !self.input.next_is_z() {
            if indent == 0 {
                self.input.lookahead(4);
                if self.input.next_is_document_indicator() {
                    break;
                }
            }

            // Fold the line breaks that precede this content line. Folded
            // scalars join lines with a space, unless either side of the
            // break is a "more indented" line.
            let trailing_blank = self.input.next_is_blank();
            if !literal && !leading_break.is_empty() && !leading_blank && !trailing_blank {
                if trailing_breaks.is_empty() {
                    string.push(' ');
                } else {
                    string.push_str(&trailing_breaks);
                }
            } else {
                string.push_str(&leading_break);
                string.push_str(&trailing_breaks);
            }
            leading_break.clear();
            trailing_breaks.clear();
            leading_blank = self.input.next_is_blank();

            // The contents of the line.
            while !self.input.next_is_breakz() {
                if is_forbidden_control(self.input.peek()) {
                    return Err(ScanError::new_str(
                        self.mark,
                        "control characters are not allowed in a scalar",
                    ));
                }
                string.push(self.input.peek());
                self.skip_char();
                self.input.lookahead(1);
            }

            self.input.lookahead(2);
            if self.input.next_is_z() {
                break;
            }
            self.read_break(&mut leading_break);

            // Eat the following indentation and empty lines.
            self.skip_block_scalar_indent(indent, &mut trailing_breaks);
        }

        // Chomp the tail.
        if chomping != Chomping::Strip {
            string.push_str(&leading_break);
            // An end of stream without a final line break still yields one if
            // the last line held content.
            if self.input.next_is_z() && self.mark.col >= indent.max(1) {
                string.push('\n');
            }
        }
        if chomping == Chomping::Keep {
            string.push_str(&trailing_breaks);
        }

        self.scalar_text.clear();
        self.scalar_text.push_str(&string);
        Ok(Token(Span::new(start, self.mark), TokenType::String(string)))
    }

    /// Scan the 1-9 digit of a block scalar header.
    fn scan_indentation_indicator(&mut self, start: Marker) -> Result<usize, ScanError> {
        if self.input.next_char_is('0') {
            return Err(ScanError::new_str(
                start,
                "while scanning a block scalar, found an indentation indicator equal to 0",
            ));
        }
        let increment = (self.input.peek() as usize) - ('0' as usize);
        self.skip_char();
        Ok(increment)
    }

    /// Skip the indentation of block scalar content lines, collecting the
    /// breaks of empty lines into `breaks`.
    fn skip_block_scalar_indent(&mut self, indent: usize, breaks: &mut String) {
        loop {
            // Consume spaces up to the content indentation. Tabs cannot be
            // used as indentation.
            while self.mark.col < indent && self.input.look_ch() == ' ' {
                self.skip_char();
            }

            self.input.lookahead(2);
            if self.input.next_is_break() {
                // An empty line.
                self.read_break(breaks);
            } else {
                break;
            }
        }
    }

    /// Determine the indentation of a block scalar from its first content
    /// line, skipping over leading empty lines.
    fn detect_block_scalar_indent(&mut self, indent: &mut usize, breaks: &mut String) {
        let mut max_indent = 0;
        loop {
            while self.input.look_ch() == ' ' {
                self.skip_char();
            }
            if self.mark.col > max_indent {
                max_indent = self.mark.col;
            }

            self.input.lookahead(2);
            if self.input.next_is_break() {
                self.read_break(breaks);
            } else {
                break;
            }
        }

        *indent = max_indent.max((self.parent_indent + 1) as usize);
    }
}

/// Parse the given text as a floating point number of the core schema.
///
/// Handles the `.inf` and `.nan` spellings with their signed and cased
/// variants. Plain `inf` and `nan` spellings are not part of the schema and
/// are rejected through the digit guard.
#[must_use]
pub fn parse_core_schema_float(text: &str) -> Option<f64> {
    match text {
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => Some(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => Some(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" | "+.nan" | "+.NaN" | "+.NAN" | "-.nan" | "-.NaN" | "-.NAN" => {
            Some(f64::NAN)
        }
        _ if text.bytes().any(|b| b.is_ascii_digit()) => text.parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::{parse_core_schema_float, Scanner, TokenType};
    use crate::input::str::StrInput;

    fn tokens(source: &str) -> Vec<TokenType> {
        let mut scanner = Scanner::new(StrInput::new(source));
        let mut out = vec![];
        loop {
            let tok = scanner.next_token().expect("scan error");
            let done = tok.1 == TokenType::EndOfInput;
            out.push(tok.1);
            if done {
                return out;
            }
        }
    }

    #[test]
    fn simple_mapping_line() {
        assert_eq!(
            tokens("foo: bar"),
            vec![
                TokenType::String("foo".into()),
                TokenType::KeySeparator,
                TokenType::String("bar".into()),
                TokenType::EndOfInput,
            ]
        );
    }

    #[test]
    fn plain_scalar_classification() {
        assert_eq!(tokens("123")[0], TokenType::Integer(123));
        assert_eq!(tokens("0o17")[0], TokenType::Integer(15));
        assert_eq!(tokens("0xFF")[0], TokenType::Integer(255));
        assert_eq!(tokens("~")[0], TokenType::Null);
        assert_eq!(tokens("TRUE")[0], TokenType::Boolean(true));
        assert_eq!(tokens("3.14")[0], TokenType::Float(3.14));
        assert_eq!(tokens(".inf")[0], TokenType::Float(f64::INFINITY));
        assert_eq!(tokens("bare word")[0], TokenType::String("bare word".into()));
        // Lookalikes that do not fit the schema stay strings.
        assert_eq!(tokens("0o18")[0], TokenType::String("0o18".into()));
        assert_eq!(tokens("1.2.3")[0], TokenType::String("1.2.3".into()));
    }

    #[test]
    fn multiline_plain_scalar_folds() {
        assert_eq!(
            tokens("key: foo\n  bar\n\n  baz"),
            vec![
                TokenType::String("key".into()),
                TokenType::KeySeparator,
                TokenType::String("foo bar\nbaz".into()),
                TokenType::EndOfInput,
            ]
        );
    }

    #[test]
    fn single_quote_escape() {
        assert_eq!(tokens("'a''b'")[0], TokenType::String("a'b".into()));
    }

    #[test]
    fn double_quote_escapes() {
        assert_eq!(tokens(r#""a\tb\né""#)[0], TokenType::String("a\tb\né".into()));
        assert_eq!(tokens(r#""\x41\U0001F600""#)[0], TokenType::String("A\u{1F600}".into()));
    }

    #[test]
    fn unknown_escape_is_an_error() {
        let mut scanner = Scanner::new(StrInput::new(r#""\q""#));
        assert!(scanner.next_token().is_err());
    }

    #[test]
    fn literal_block_scalar() {
        assert_eq!(
            tokens("key: |\n  a\n  b\n")[2],
            TokenType::String("a\nb\n".into())
        );
    }

    #[test]
    fn folded_block_scalar() {
        assert_eq!(
            tokens("key: >\n  a\n  b\n\n  c\n")[2],
            TokenType::String("a b\nc\n".into())
        );
    }

    #[test]
    fn block_scalar_chomping() {
        assert_eq!(tokens("key: |-\n  a\n\n")[2], TokenType::String("a".into()));
        assert_eq!(
            tokens("key: |+\n  a\n\n")[2],
            TokenType::String("a\n\n".into())
        );
    }

    #[test]
    fn block_scalar_explicit_indent() {
        assert_eq!(
            tokens("key: |2\n   a\n")[2],
            TokenType::String(" a\n".into())
        );
    }

    #[test]
    fn directives_and_markers() {
        assert_eq!(
            tokens("%YAML 1.2\n---\nfoo\n..."),
            vec![
                TokenType::YamlDirective(1, 2),
                TokenType::DocumentStart,
                TokenType::String("foo".into()),
                TokenType::DocumentEnd,
                TokenType::EndOfInput,
            ]
        );
    }

    #[test]
    fn tag_lexemes_keep_their_spelling() {
        assert_eq!(tokens("!!str x")[0], TokenType::Tag("!!str".into()));
        assert_eq!(tokens("! x")[0], TokenType::Tag("!".into()));
        assert_eq!(
            tokens("!<tag:yaml.org,2002:map> {}")[0],
            TokenType::Tag("!<tag:yaml.org,2002:map>".into())
        );
        assert_eq!(tokens("!foo!bar x")[0], TokenType::Tag("!foo!bar".into()));
    }

    #[test]
    fn flow_tokens() {
        assert_eq!(
            tokens("[1, {a: 2}]"),
            vec![
                TokenType::FlowSequenceBegin,
                TokenType::Integer(1),
                TokenType::ValueSeparator,
                TokenType::FlowMappingBegin,
                TokenType::String("a".into()),
                TokenType::KeySeparator,
                TokenType::Integer(2),
                TokenType::FlowMappingEnd,
                TokenType::FlowSequenceEnd,
                TokenType::EndOfInput,
            ]
        );
    }

    #[test]
    fn adjacent_value_after_quoted_key() {
        assert_eq!(
            tokens(r#"{"a":1}"#),
            vec![
                TokenType::FlowMappingBegin,
                TokenType::String("a".into()),
                TokenType::KeySeparator,
                TokenType::Integer(1),
                TokenType::FlowMappingEnd,
                TokenType::EndOfInput,
            ]
        );
    }

    #[test]
    fn colon_inside_flow_plain_scalar() {
        assert_eq!(
            tokens("[a:b]")[1],
            TokenType::String("a:b".into()),
        );
    }

    #[test]
    fn comments_are_tokens() {
        assert_eq!(
            tokens("# hello\nfoo: 1 # trailing"),
            vec![
                TokenType::Comment,
                TokenType::String("foo".into()),
                TokenType::KeySeparator,
                TokenType::Integer(1),
                TokenType::Comment,
                TokenType::EndOfInput,
            ]
        );
    }

    #[test]
    fn reserved_indicators_are_rejected() {
        let mut scanner = Scanner::new(StrInput::new("@foo"));
        assert!(scanner.next_token().is_err());
        let mut scanner = Scanner::new(StrInput::new("`foo"));
        assert!(scanner.next_token().is_err());
    }

    #[test]
    fn anchors_and_aliases() {
        assert_eq!(
            tokens("- &a 1\n- *a"),
            vec![
                TokenType::BlockSequenceEntry,
                TokenType::Anchor("a".into()),
                TokenType::Integer(1),
                TokenType::BlockSequenceEntry,
                TokenType::Alias("a".into()),
                TokenType::EndOfInput,
            ]
        );
    }

    #[test]
    fn core_schema_floats() {
        assert_eq!(parse_core_schema_float("-.inf"), Some(f64::NEG_INFINITY));
        assert!(parse_core_schema_float("-.nan").unwrap().is_nan());
        assert_eq!(parse_core_schema_float("6.8523015e+5"), Some(685_230.15));
        assert_eq!(parse_core_schema_float("nan"), None);
        assert_eq!(parse_core_schema_float("inf"), None);
    }

    #[test]
    fn token_streams_are_deterministic() {
        let source = "a: [1, 2]\nb: &x c\nd: *x\n";
        assert_eq!(tokens(source), tokens(source));
    }
}
