//! The document builder.
//!
//! Pulls tokens from the scanner and composes the document tree: block and
//! flow collections, node properties, anchors and aliases, directives and
//! document boundaries.

use std::collections::HashMap;

use citrine_parser::{
    BufferedInput, Input, ScanError, Scanner, Span, StrInput, TokenType, YamlVersion,
};

use crate::node::NodeData;
use crate::{Error, Mapping, Node, Result, Scalar, Sequence};

/// Parse a single-document stream into its root node.
///
/// The stream must contain exactly one document; further content after the
/// first document is a parse error, and an input without any document is a
/// domain error.
///
/// # Errors
/// Returns an error when the input is not valid YAML.
pub fn deserialize(source: &str) -> Result<Node> {
    Deserializer::new(Scanner::new(StrInput::new(source))).single_document()
}

/// Parse every document of a stream, in order.
///
/// An empty stream yields an empty list.
///
/// # Errors
/// Returns an error when the input is not valid YAML. An error in a later
/// document prevents the earlier ones from being returned.
pub fn deserialize_docs(source: &str) -> Result<Vec<Node>> {
    Deserializer::new(Scanner::new(StrInput::new(source))).parse_documents(false)
}

/// Parse a single-document stream of raw bytes, which must be UTF-8.
///
/// # Errors
/// See [`deserialize`]; invalid UTF-8 is a domain error.
pub fn deserialize_slice(source: &[u8]) -> Result<Node> {
    let source = std::str::from_utf8(source)
        .map_err(|e| Error::Domain(format!("the input is not valid UTF-8: {e}")))?;
    deserialize(source)
}

/// Parse a single-document stream from a character iterator.
///
/// # Errors
/// See [`deserialize`].
pub fn deserialize_from_iter<I: Iterator<Item = char>>(source: I) -> Result<Node> {
    Deserializer::new(Scanner::new(BufferedInput::new(source))).single_document()
}

/// Parse every document of a character iterator, in order.
///
/// # Errors
/// See [`deserialize_docs`].
pub fn deserialize_docs_from_iter<I: Iterator<Item = char>>(source: I) -> Result<Vec<Node>> {
    Deserializer::new(Scanner::new(BufferedInput::new(source))).parse_documents(false)
}

/// A token with its position and, for scalars, the raw text it came from.
struct Pending {
    span: Span,
    token: TokenType,
    raw: Option<String>,
}

/// The node properties (tag and anchor) accumulated before a node.
#[derive(Default)]
struct Props {
    tag: Option<(String, Span)>,
    anchor: Option<(String, Span)>,
}

impl Props {
    fn first_line(&self) -> Option<usize> {
        let tag = self.tag.as_ref().map(|(_, s)| s.start.line());
        let anchor = self.anchor.as_ref().map(|(_, s)| s.start.line());
        match (tag, anchor) {
            (Some(t), Some(a)) => Some(t.min(a)),
            (t, a) => t.or(a),
        }
    }
}

/// The per-document state dictated by directives.
#[derive(Default)]
struct DocumentMeta {
    version: YamlVersion,
    version_explicit: bool,
    tag_handles: HashMap<String, String>,
}

/// The document builder.
struct Deserializer<T: Input> {
    scanner: Scanner<T>,
    peeked: Option<Pending>,
    meta: DocumentMeta,
    /// Anchor definitions in source order. Later definitions shadow earlier
    /// ones, but all are retained so an alias binds to the nearest preceding
    /// definition of its name.
    anchors: Vec<(String, Node)>,
}

impl<T: Input> Deserializer<T> {
    fn new(scanner: Scanner<T>) -> Self {
        Deserializer {
            scanner,
            peeked: None,
            meta: DocumentMeta::default(),
            anchors: Vec::new(),
        }
    }

    fn error_at(&self, span: Span, msg: impl Into<String>) -> Error {
        Error::Parse(ScanError::new(span.start, msg.into()))
    }

    // -----------------------------------------------------------------
    // The token stream, with one token of lookahead.

    fn fill(&mut self) -> Result<()> {
        while self.peeked.is_none() {
            let tok = self.scanner.next_token()?;
            // Comments and reserved directives are whitespace-equivalent.
            if matches!(tok.1, TokenType::Comment | TokenType::InvalidDirective) {
                continue;
            }
            let raw = match tok.1 {
                TokenType::Null
                | TokenType::Boolean(_)
                | TokenType::Integer(_)
                | TokenType::Float(_)
                | TokenType::String(_) => Some(self.scanner.scalar_text().to_owned()),
                _ => None,
            };
            self.peeked = Some(Pending {
                span: tok.0,
                token: tok.1,
                raw,
            });
        }
        Ok(())
    }

    fn peek(&mut self) -> Result<&Pending> {
        self.fill()?;
        match self.peeked.as_ref() {
            Some(p) => Ok(p),
            None => Err(Error::Domain("the scanner yielded no token".into())),
        }
    }

    fn bump(&mut self) -> Result<Pending> {
        self.fill()?;
        match self.peeked.take() {
            Some(p) => Ok(p),
            None => Err(Error::Domain("the scanner yielded no token".into())),
        }
    }

    // -----------------------------------------------------------------
    // Documents.

    fn single_document(mut self) -> Result<Node> {
        let mut docs = self.parse_documents(true)?;
        docs.pop()
            .ok_or_else(|| Error::Domain("the input contains no YAML document".into()))
    }

    fn parse_documents(&mut self, single: bool) -> Result<Vec<Node>> {
        let mut docs = Vec::new();
        loop {
            self.parse_directives()?;

            if single && !docs.is_empty() && !matches!(self.peek()?.token, TokenType::EndOfInput)
            {
                let span = self.peek()?.span;
                return Err(self.error_at(
                    span,
                    "deserializing a single document, but the stream continues",
                ));
            }

            let mut marked = false;
            if matches!(self.peek()?.token, TokenType::DocumentStart) {
                self.bump()?;
                marked = true;
            }

            if matches!(self.peek()?.token, TokenType::EndOfInput) {
                if marked {
                    docs.push(Node::null());
                }
                break;
            }
            if matches!(self.peek()?.token, TokenType::DocumentStart) {
                // Two consecutive `---` markers: an empty document.
                docs.push(Node::null());
                self.reset_document_state();
                continue;
            }
            if matches!(self.peek()?.token, TokenType::DocumentEnd) {
                self.bump()?;
                docs.push(Node::null());
                self.reset_document_state();
                continue;
            }

            let root = self.parse_block_node(-1)?;
            docs.push(root);

            if matches!(self.peek()?.token, TokenType::DocumentEnd) {
                self.bump()?;
                self.reset_document_state();
            } else if matches!(
                self.peek()?.token,
                TokenType::DocumentStart
                    | TokenType::YamlDirective(..)
                    | TokenType::TagDirective(..)
            ) {
                self.reset_document_state();
            } else if !matches!(self.peek()?.token, TokenType::EndOfInput) {
                let span = self.peek()?.span;
                return Err(self.error_at(span, "did not find expected document separator"));
            }
        }
        Ok(docs)
    }

    fn parse_directives(&mut self) -> Result<()> {
        loop {
            if !matches!(
                self.peek()?.token,
                TokenType::YamlDirective(..) | TokenType::TagDirective(..)
            ) {
                return Ok(());
            }
            let p = self.bump()?;
            match p.token {
                TokenType::YamlDirective(major, minor) => {
                    if self.meta.version_explicit {
                        return Err(self.error_at(p.span, "found a duplicate YAML directive"));
                    }
                    let version = match (major, minor) {
                        (1, 0 | 1) => YamlVersion::V1_1,
                        // Higher 1.x minors are read as the newest known
                        // version.
                        (1, _) => YamlVersion::V1_2,
                        _ => {
                            return Err(
                                self.error_at(p.span, format!("unsupported YAML version {major}.{minor}"))
                            )
                        }
                    };
                    self.meta.version = version;
                    self.meta.version_explicit = true;
                    self.scanner.set_version(version);
                }
                TokenType::TagDirective(handle, prefix) => {
                    if self.meta.tag_handles.contains_key(&handle) {
                        return Err(self.error_at(
                            p.span,
                            format!("found a duplicate %TAG directive for handle '{handle}'"),
                        ));
                    }
                    self.meta.tag_handles.insert(handle, prefix);
                }
                _ => return Err(Error::Domain("expected a directive token".into())),
            }
        }
    }

    fn reset_document_state(&mut self) {
        self.meta = DocumentMeta::default();
        self.anchors.clear();
        self.scanner.set_version(YamlVersion::default());
    }

    // -----------------------------------------------------------------
    // Block composition.

    /// Parse one block-context node whose content must lie at a column
    /// greater than `min_indent`.
    fn parse_block_node(&mut self, min_indent: isize) -> Result<Node> {
        let props = self.parse_properties()?;

        let span = self.peek()?.span;
        let col = span.start.col() as isize;

        if matches!(self.peek()?.token, TokenType::BlockSequenceEntry) {
            if col <= min_indent {
                return Err(self.error_at(span, "wrongly indented block sequence entry"));
            }
            let node = self.parse_block_sequence(col)?;
            return self.apply_properties(node, props, None);
        }

        if matches!(self.peek()?.token, TokenType::ExplicitKey) {
            if col <= min_indent {
                return Err(self.error_at(span, "wrongly indented explicit key"));
            }
            self.bump()?;
            let first = self.parse_explicit_key_body(col, span)?;
            let node = self.parse_block_mapping(col, first)?;
            return self.apply_properties(node, props, None);
        }

        // A scalar, alias or flow collection; possibly the first key of a
        // block mapping.
        let atom_line = span.start.line();
        let (node, raw) = self.parse_atom(&props)?;

        let next_is_separator = matches!(
            self.peek()?.token,
            TokenType::KeySeparator | TokenType::BlockMappingPrefix
        );
        let separator_col = self.peek()?.span.start.col() as isize;

        if next_is_separator && col > min_indent && separator_col > min_indent {
            // Properties on a line of their own belong to the mapping, not
            // to its first key.
            if props.first_line().is_some_and(|line| line < atom_line) {
                let map = self.parse_block_mapping(col, (node, span, false))?;
                self.apply_properties(map, props, None)
            } else {
                let key = self.apply_properties(node, props, raw.as_deref())?;
                self.parse_block_mapping(col, (key, span, false))
            }
        } else {
            self.apply_properties(node, props, raw.as_deref())
        }
    }

    /// Parse a block sequence whose `-` indicators sit at column `indent`.
    ///
    /// The caller has checked that the next token is a sequence entry.
    fn parse_block_sequence(&mut self, indent: isize) -> Result<Node> {
        let mut seq = Sequence::new();
        loop {
            let entry = self.bump()?;
            let entry_line = entry.span.start.line();

            let stop = matches!(
                self.peek()?.token,
                TokenType::EndOfInput | TokenType::DocumentStart | TokenType::DocumentEnd
            );
            let is_entry = matches!(self.peek()?.token, TokenType::BlockSequenceEntry);
            let span = self.peek()?.span;
            let col = span.start.col() as isize;
            let line = span.start.line();

            let value = if stop {
                Node::null()
            } else if line == entry_line {
                self.parse_block_node(indent)?
            } else if is_entry && col == indent {
                // An empty entry.
                Node::null()
            } else if col > indent {
                self.parse_block_node(indent)?
            } else {
                Node::null()
            };
            seq.push(value);

            let stop = matches!(
                self.peek()?.token,
                TokenType::EndOfInput | TokenType::DocumentStart | TokenType::DocumentEnd
            );
            let is_entry = matches!(self.peek()?.token, TokenType::BlockSequenceEntry);
            let nspan = self.peek()?.span;
            let ncol = nspan.start.col() as isize;

            if is_entry && ncol == indent {
                continue;
            }
            if stop || ncol <= indent {
                break;
            }
            return Err(self.error_at(nspan, "wrongly indented content in block sequence"));
        }
        Ok(Node::from(seq))
    }

    /// Parse a block mapping at column `indent`, starting from an already
    /// parsed first key.
    fn parse_block_mapping(
        &mut self,
        indent: isize,
        first: (Node, Span, bool),
    ) -> Result<Node> {
        let mut map = Mapping::new();
        let (mut key, mut key_span, mut explicit) = first;
        loop {
            // The value of the current key.
            let sep_span = self.peek()?.span;
            let inline_sep = matches!(self.peek()?.token, TokenType::KeySeparator);
            let nested_sep = matches!(self.peek()?.token, TokenType::BlockMappingPrefix);
            let value = if inline_sep {
                let sep = self.bump()?;
                self.parse_inline_value(indent, sep.span.start.line())?
            } else if nested_sep {
                self.bump()?;
                self.parse_nested_value(indent)?
            } else if explicit {
                Node::null()
            } else {
                return Err(
                    self.error_at(sep_span, "did not find expected ':' with mapping value")
                );
            };
            if map.contains_key(&key) {
                return Err(self.error_at(key_span, "found a duplicate mapping key"));
            }
            map.insert(key, value);

            // The next key, if the mapping continues at this indentation.
            let stop = matches!(
                self.peek()?.token,
                TokenType::EndOfInput | TokenType::DocumentStart | TokenType::DocumentEnd
            );
            let is_explicit = matches!(self.peek()?.token, TokenType::ExplicitKey);
            let can_start_key = matches!(
                self.peek()?.token,
                TokenType::Anchor(_)
                    | TokenType::Tag(_)
                    | TokenType::Alias(_)
                    | TokenType::Null
                    | TokenType::Boolean(_)
                    | TokenType::Integer(_)
                    | TokenType::Float(_)
                    | TokenType::String(_)
                    | TokenType::FlowSequenceBegin
                    | TokenType::FlowMappingBegin
            );
            let nspan = self.peek()?.span;
            let ncol = nspan.start.col() as isize;

            if stop || ncol < indent {
                break;
            }
            if is_explicit && ncol == indent {
                self.bump()?;
                (key, key_span, explicit) = self.parse_explicit_key_body(indent, nspan)?;
            } else if can_start_key && ncol == indent {
                let (k, s) = self.parse_simple_key()?;
                key = k;
                key_span = s;
                explicit = false;
            } else {
                return Err(self.error_at(nspan, "wrongly indented content in block mapping"));
            }
        }
        Ok(Node::from(map))
    }

    /// Parse the key of an explicit `?` entry. The `?` has been consumed.
    fn parse_explicit_key_body(
        &mut self,
        indent: isize,
        marker_span: Span,
    ) -> Result<(Node, Span, bool)> {
        let stop = matches!(
            self.peek()?.token,
            TokenType::EndOfInput | TokenType::DocumentStart | TokenType::DocumentEnd
        );
        let at_separator = matches!(
            self.peek()?.token,
            TokenType::KeySeparator | TokenType::BlockMappingPrefix
        );
        let is_entry = matches!(self.peek()?.token, TokenType::BlockSequenceEntry);
        let span = self.peek()?.span;
        let col = span.start.col() as isize;

        let key = if stop || at_separator {
            Node::null()
        } else if is_entry && col > indent {
            self.parse_block_sequence(col)?
        } else if span.start.line() == marker_span.start.line() {
            // On the marker's line the key cannot open an implicit block
            // mapping; a `:` there separates the key from its value.
            self.parse_simple_key()?.0
        } else if col > indent {
            self.parse_block_node(indent)?
        } else {
            Node::null()
        };
        Ok((key, marker_span, true))
    }

    /// Parse a simple (single atom) key with its properties.
    fn parse_simple_key(&mut self) -> Result<(Node, Span)> {
        let span = self.peek()?.span;
        let props = self.parse_properties()?;
        let (node, raw) = self.parse_atom(&props)?;
        let node = self.apply_properties(node, props, raw.as_deref())?;
        Ok((node, span))
    }

    /// Parse the value following a `: ` on the same line as its key.
    fn parse_inline_value(&mut self, indent: isize, separator_line: usize) -> Result<Node> {
        if matches!(
            self.peek()?.token,
            TokenType::EndOfInput | TokenType::DocumentStart | TokenType::DocumentEnd
        ) {
            return Ok(Node::null());
        }
        if self.peek()?.span.start.line() > separator_line {
            // Nothing followed the separator on its line after all.
            self.parse_nested_value(indent)
        } else {
            self.parse_block_node(indent)
        }
    }

    /// Parse the value of a key whose `:` ended its line.
    fn parse_nested_value(&mut self, indent: isize) -> Result<Node> {
        let stop = matches!(
            self.peek()?.token,
            TokenType::EndOfInput | TokenType::DocumentStart | TokenType::DocumentEnd
        );
        let is_entry = matches!(self.peek()?.token, TokenType::BlockSequenceEntry);
        let span = self.peek()?.span;
        let col = span.start.col() as isize;

        if stop {
            Ok(Node::null())
        } else if is_entry && col >= indent {
            // A nested sequence may sit at the same column as its key.
            self.parse_block_sequence(col)
        } else if col > indent {
            self.parse_block_node(indent)
        } else {
            Ok(Node::null())
        }
    }

    // -----------------------------------------------------------------
    // Atoms: scalars, aliases and flow collections.

    /// Consume one value atom. Returns the bare node (properties not yet
    /// applied) and the raw scalar text when the atom was a scalar.
    fn parse_atom(&mut self, props: &Props) -> Result<(Node, Option<String>)> {
        let p = self.bump()?;
        match p.token {
            TokenType::Null => Ok((Node::null(), p.raw)),
            TokenType::Boolean(v) => Ok((Node::boolean(v), p.raw)),
            TokenType::Integer(v) => Ok((Node::integer(v), p.raw)),
            TokenType::Float(v) => Ok((Node::float(v), p.raw)),
            TokenType::String(v) => Ok((Node::string(v), p.raw)),
            TokenType::Alias(name) => {
                if let Some((_, span)) = &props.tag {
                    return Err(self.error_at(*span, "an alias node must not carry a tag"));
                }
                if let Some((_, span)) = &props.anchor {
                    return Err(self.error_at(*span, "an alias node must not carry an anchor"));
                }
                Ok((self.resolve_alias(&name, p.span)?, None))
            }
            TokenType::FlowSequenceBegin => Ok((self.parse_flow_sequence(p.span)?, None)),
            TokenType::FlowMappingBegin => Ok((self.parse_flow_mapping(p.span)?, None)),
            _ => Err(self.error_at(p.span, "did not find expected node content")),
        }
    }

    fn resolve_alias(&self, name: &str, span: Span) -> Result<Node> {
        for (anchor, node) in self.anchors.iter().rev() {
            if anchor == name {
                let mut copy = node.clone();
                copy.mark_alias(name.to_owned());
                return Ok(copy);
            }
        }
        Err(self.error_at(span, format!("no anchor named '{name}' was found")))
    }

    fn parse_flow_node(&mut self) -> Result<Node> {
        let props = self.parse_properties()?;
        let (node, raw) = self.parse_atom(&props)?;
        self.apply_properties(node, props, raw.as_deref())
    }

    /// Parse a flow sequence. The `[` has been consumed.
    fn parse_flow_sequence(&mut self, open_span: Span) -> Result<Node> {
        let mut seq = Sequence::new();
        loop {
            if matches!(self.peek()?.token, TokenType::FlowSequenceEnd) {
                self.bump()?;
                break;
            }
            if matches!(self.peek()?.token, TokenType::EndOfInput) {
                return Err(
                    self.error_at(open_span, "unexpected end of input inside a flow sequence")
                );
            }

            let item = self.parse_flow_node()?;
            // `[ key: value ]` makes the entry a single-pair mapping.
            let item = if matches!(self.peek()?.token, TokenType::KeySeparator) {
                self.bump()?;
                let value = if matches!(
                    self.peek()?.token,
                    TokenType::ValueSeparator | TokenType::FlowSequenceEnd
                ) {
                    Node::null()
                } else {
                    self.parse_flow_node()?
                };
                let mut pair = Mapping::new();
                pair.insert(item, value);
                Node::from(pair)
            } else {
                item
            };
            seq.push(item);

            if matches!(self.peek()?.token, TokenType::ValueSeparator) {
                self.bump()?;
            } else if !matches!(self.peek()?.token, TokenType::FlowSequenceEnd) {
                let span = self.peek()?.span;
                return Err(self.error_at(span, "did not find expected ',' or ']' in flow sequence"));
            }
        }
        Ok(Node::from(seq))
    }

    /// Parse a flow mapping. The `{` has been consumed.
    fn parse_flow_mapping(&mut self, open_span: Span) -> Result<Node> {
        let mut map = Mapping::new();
        loop {
            if matches!(self.peek()?.token, TokenType::FlowMappingEnd) {
                self.bump()?;
                break;
            }
            if matches!(self.peek()?.token, TokenType::EndOfInput) {
                return Err(
                    self.error_at(open_span, "unexpected end of input inside a flow mapping")
                );
            }
            if matches!(self.peek()?.token, TokenType::ExplicitKey) {
                self.bump()?;
            }

            let key_span = self.peek()?.span;
            let key = if matches!(self.peek()?.token, TokenType::KeySeparator) {
                Node::null()
            } else {
                self.parse_flow_node()?
            };
            let value = if matches!(self.peek()?.token, TokenType::KeySeparator) {
                self.bump()?;
                if matches!(
                    self.peek()?.token,
                    TokenType::ValueSeparator | TokenType::FlowMappingEnd
                ) {
                    Node::null()
                } else {
                    self.parse_flow_node()?
                }
            } else {
                // A bare key has a null value.
                Node::null()
            };
            if map.contains_key(&key) {
                return Err(self.error_at(key_span, "found a duplicate mapping key"));
            }
            map.insert(key, value);

            if matches!(self.peek()?.token, TokenType::ValueSeparator) {
                self.bump()?;
            } else if !matches!(self.peek()?.token, TokenType::FlowMappingEnd) {
                let span = self.peek()?.span;
                return Err(self.error_at(span, "did not find expected ',' or '}' in flow mapping"));
            }
        }
        Ok(Node::from(map))
    }

    // -----------------------------------------------------------------
    // Node properties, tags and anchors.

    fn parse_properties(&mut self) -> Result<Props> {
        let mut props = Props::default();
        loop {
            let is_tag = matches!(self.peek()?.token, TokenType::Tag(_));
            let is_anchor = matches!(self.peek()?.token, TokenType::Anchor(_));
            if !is_tag && !is_anchor {
                return Ok(props);
            }
            let p = self.bump()?;
            match p.token {
                TokenType::Tag(text) => {
                    if props.tag.is_some() {
                        return Err(self.error_at(p.span, "found multiple tags for one node"));
                    }
                    props.tag = Some((text, p.span));
                }
                TokenType::Anchor(name) => {
                    if props.anchor.is_some() {
                        return Err(self.error_at(p.span, "found multiple anchors for one node"));
                    }
                    props.anchor = Some((name, p.span));
                }
                _ => return Err(Error::Domain("expected a node property token".into())),
            }
        }
    }

    /// Attach the accumulated properties to a node: record its tag (possibly
    /// reinterpreting a scalar), record its anchor and register the anchor
    /// definition.
    fn apply_properties(
        &mut self,
        node: Node,
        props: Props,
        raw: Option<&str>,
    ) -> Result<Node> {
        let mut node = node;
        if let Some((text, span)) = props.tag {
            node = self.apply_tag(node, &text, raw, span)?;
            node.add_tag_name(text)?;
        }
        if let Some((name, _)) = props.anchor {
            node.add_anchor_name(name.clone())?;
            self.anchors.push((name, node.clone()));
        }
        Ok(node)
    }

    /// Enforce the kind named by a tag, if it names one.
    ///
    /// A tag of the core schema wins over the scanner's classification: the
    /// raw scalar text is re-read as the tagged kind, and a text that does
    /// not conform is a parse error. Other tags leave the value untouched.
    fn apply_tag(&self, node: Node, text: &str, raw: Option<&str>, span: Span) -> Result<Node> {
        let resolved = self.resolve_tag(text, span)?;
        let Some(kind) = resolved.strip_prefix("tag:yaml.org,2002:") else {
            return Ok(node);
        };
        let mut node = node;
        match kind {
            "seq" => {
                if node.is_sequence() {
                    Ok(node)
                } else {
                    Err(self.incompatible_tag(span, text, &node))
                }
            }
            "map" => {
                if node.is_mapping() {
                    Ok(node)
                } else {
                    Err(self.incompatible_tag(span, text, &node))
                }
            }
            "str" | "null" | "bool" | "int" | "float" => {
                if !node.is_scalar() {
                    return Err(self.incompatible_tag(span, text, &node));
                }
                let raw = raw.unwrap_or_default();
                let scalar = match kind {
                    "str" => Some(Scalar::String(raw.to_owned())),
                    "null" => Scalar::parse_null(raw),
                    "bool" => Scalar::parse_boolean(raw).or_else(|| {
                        if self.meta.version == YamlVersion::V1_1 {
                            match raw {
                                "yes" | "Yes" | "YES" | "on" | "On" | "ON" => {
                                    Some(Scalar::Boolean(true))
                                }
                                "no" | "No" | "NO" | "off" | "Off" | "OFF" => {
                                    Some(Scalar::Boolean(false))
                                }
                                _ => None,
                            }
                        } else {
                            None
                        }
                    }),
                    "int" => Scalar::parse_integer(raw),
                    "float" => Scalar::parse_float(raw),
                    _ => None,
                };
                match scalar {
                    Some(scalar) => {
                        node.replace_data(NodeData::Scalar(scalar));
                        Ok(node)
                    }
                    None => Err(self.error_at(
                        span,
                        format!("the scalar '{raw}' does not conform to its '{text}' tag"),
                    )),
                }
            }
            _ => Ok(node),
        }
    }

    fn incompatible_tag(&self, span: Span, text: &str, node: &Node) -> Error {
        self.error_at(
            span,
            format!("the tag '{}' does not accept a {} node", text, node.kind()),
        )
    }

    /// Resolve a tag lexeme to a full tag name using the active handles.
    fn resolve_tag(&self, text: &str, span: Span) -> Result<String> {
        if text == "!" {
            // The non-specific tag leaves resolution to the kind of the node.
            return Ok("!".to_owned());
        }
        if let Some(inner) = text.strip_prefix("!<") {
            return Ok(inner.strip_suffix('>').unwrap_or(inner).to_owned());
        }

        let body = &text[1..];
        let (handle, suffix) = if let Some(rest) = body.strip_prefix('!') {
            ("!!".to_owned(), rest)
        } else if let Some(pos) = body.find('!') {
            (format!("!{}!", &body[..pos]), &body[pos + 1..])
        } else {
            ("!".to_owned(), body)
        };

        let prefix = match self.meta.tag_handles.get(&handle) {
            Some(prefix) => prefix.clone(),
            None => match handle.as_str() {
                "!" => "!".to_owned(),
                "!!" => "tag:yaml.org,2002:".to_owned(),
                _ => {
                    return Err(
                        self.error_at(span, format!("found an undeclared tag handle '{handle}'"))
                    )
                }
            },
        };
        Ok(format!("{prefix}{suffix}"))
    }
}
