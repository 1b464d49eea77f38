//! Writing a document tree back out as YAML text.

use std::fmt;

use citrine_parser::parse_core_schema_float;

use crate::node::NodeData;
use crate::{Error, Node, Result, Scalar};

/// Serialize the tree rooted at `node` into block-style YAML text.
///
/// # Errors
/// Returns a domain error if the output sink refuses the write, which a
/// `String` sink never does.
pub fn serialize(node: &Node) -> Result<String> {
    let mut out = String::new();
    Serializer::new(&mut out)
        .dump(node)
        .map_err(|e| Error::Domain(format!("the serializer could not write its output: {e}")))?;
    Ok(out)
}

/// Serialize several documents, separated by `...` end markers.
///
/// # Errors
/// See [`serialize`].
pub fn serialize_docs(docs: &[Node]) -> Result<String> {
    let mut out = String::new();
    for (i, doc) in docs.iter().enumerate() {
        if i > 0 {
            out.push_str("...\n");
        }
        Serializer::new(&mut out)
            .dump(doc)
            .map_err(|e| Error::Domain(format!("the serializer could not write its output: {e}")))?;
    }
    Ok(out)
}

/// The YAML serializer.
///
/// Emits block style with a two-space indentation step. Strings are written
/// plain whenever re-reading them yields the same node, and double-quoted
/// otherwise. Anchors and tags are written back for the nodes carrying them;
/// nodes expanded from aliases are written as plain copies.
///
/// ```
/// use citrine::Serializer;
///
/// let doc = citrine::deserialize("a: 1\nb: [2, 3]").unwrap();
/// let mut out = String::new();
/// Serializer::new(&mut out).dump(&doc).unwrap();
/// assert_eq!(out, "a: 1\nb:\n  - 2\n  - 3\n");
/// ```
pub struct Serializer<'a> {
    writer: &'a mut dyn fmt::Write,
    best_indent: usize,
}

impl<'a> Serializer<'a> {
    /// Create a new serializer writing into `writer`.
    pub fn new(writer: &'a mut dyn fmt::Write) -> Self {
        Serializer {
            writer,
            best_indent: 2,
        }
    }

    /// Write one document.
    ///
    /// # Errors
    /// Forwards errors of the underlying writer.
    pub fn dump(&mut self, node: &Node) -> fmt::Result {
        match node.data() {
            NodeData::Scalar(_) => {
                self.write_properties(node, true)?;
                self.write_scalar_value(node)?;
                self.writer.write_char('\n')
            }
            NodeData::Sequence(seq) if seq.is_empty() => {
                self.write_properties(node, true)?;
                self.writer.write_str("[]\n")
            }
            NodeData::Mapping(map) if map.is_empty() => {
                self.write_properties(node, true)?;
                self.writer.write_str("{}\n")
            }
            _ => {
                if self.write_properties(node, false)? {
                    self.writer.write_char('\n')?;
                }
                self.write_block(node, 0)
            }
        }
    }

    /// Emit a container node in block notation at the given indentation.
    fn write_block(&mut self, node: &Node, indent: usize) -> fmt::Result {
        match node.data() {
            NodeData::Sequence(seq) => {
                for item in seq {
                    self.write_indent(indent)?;
                    self.writer.write_char('-')?;
                    self.write_entry(item, indent)?;
                }
                Ok(())
            }
            NodeData::Mapping(map) => {
                for (key, value) in map {
                    self.write_indent(indent)?;
                    if key.is_scalar() {
                        self.write_properties(key, true)?;
                        self.write_scalar_value(key)?;
                        self.writer.write_char(':')?;
                        self.write_entry(value, indent)?;
                    } else {
                        // A container key takes the explicit form.
                        self.writer.write_char('?')?;
                        self.write_entry(key, indent)?;
                        self.write_indent(indent)?;
                        self.writer.write_char(':')?;
                        self.write_entry(value, indent)?;
                    }
                }
                Ok(())
            }
            NodeData::Scalar(_) => Ok(()),
        }
    }

    /// Emit a node appearing after a `-` or `:` indicator. Scalars and empty
    /// containers stay on the indicator's line; anything else moves below
    /// it, indented one step further.
    fn write_entry(&mut self, node: &Node, indent: usize) -> fmt::Result {
        let inline = match node.data() {
            NodeData::Scalar(_) => true,
            NodeData::Sequence(seq) => seq.is_empty(),
            NodeData::Mapping(map) => map.is_empty(),
        };
        if inline {
            self.writer.write_char(' ')?;
            self.write_properties(node, true)?;
            match node.data() {
                NodeData::Scalar(_) => self.write_scalar_value(node)?,
                NodeData::Sequence(_) => self.writer.write_str("[]")?,
                NodeData::Mapping(_) => self.writer.write_str("{}")?,
            }
            self.writer.write_char('\n')
        } else {
            if self.properties_of(node).is_some() {
                self.writer.write_char(' ')?;
                self.write_properties(node, false)?;
            }
            self.writer.write_char('\n')?;
            self.write_block(node, indent + self.best_indent)
        }
    }

    fn write_indent(&mut self, indent: usize) -> fmt::Result {
        for _ in 0..indent {
            self.writer.write_char(' ')?;
        }
        Ok(())
    }

    /// The `&anchor !tag` prefix for a node, if it carries properties.
    ///
    /// Alias nodes carry the anchor name they were expanded from; writing it
    /// back as a definition would change the document's meaning, so aliases
    /// are emitted as bare copies.
    fn properties_of(&self, node: &Node) -> Option<String> {
        if node.is_alias() {
            return None;
        }
        let mut parts = Vec::new();
        if let Some(anchor) = node.anchor_name() {
            parts.push(format!("&{anchor}"));
        }
        if let Some(tag) = node.tag_name() {
            parts.push(tag.to_owned());
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// Write the property prefix. Returns whether anything was written.
    fn write_properties(
        &mut self,
        node: &Node,
        trailing_space: bool,
    ) -> std::result::Result<bool, fmt::Error> {
        match self.properties_of(node) {
            Some(prefix) => {
                self.writer.write_str(&prefix)?;
                if trailing_space {
                    self.writer.write_char(' ')?;
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn write_scalar_value(&mut self, node: &Node) -> fmt::Result {
        let NodeData::Scalar(scalar) = node.data() else {
            return Ok(());
        };
        match scalar {
            Scalar::Null => self.writer.write_str("null"),
            Scalar::Boolean(true) => self.writer.write_str("true"),
            Scalar::Boolean(false) => self.writer.write_str("false"),
            Scalar::Integer(v) => write!(self.writer, "{v}"),
            Scalar::Float(v) => {
                let f = v.into_inner();
                if f.is_nan() {
                    self.writer.write_str(".nan")
                } else if f == f64::INFINITY {
                    self.writer.write_str(".inf")
                } else if f == f64::NEG_INFINITY {
                    self.writer.write_str("-.inf")
                } else if f == f.trunc() {
                    // Keep a decimal point so the value reads back as a float.
                    write!(self.writer, "{f:.1}")
                } else {
                    write!(self.writer, "{f}")
                }
            }
            Scalar::String(s) => {
                if needs_quotes(s) {
                    escape_str(self.writer, s)
                } else {
                    self.writer.write_str(s)
                }
            }
        }
    }
}

/// Check whether a string scalar must be quoted to read back as itself.
///
/// Quoting is required for the empty string, leading or trailing blanks,
/// leading indicator characters, any embedded character that could open a
/// comment, a flow collection or an escape, control characters, and spellings
/// that would re-read as null, boolean or a number.
fn needs_quotes(string: &str) -> bool {
    string.is_empty()
        || string.starts_with(' ')
        || string.ends_with(' ')
        || string.starts_with(|c: char| {
            matches!(
                c,
                '&' | '*'
                    | '?'
                    | '|'
                    | '-'
                    | '<'
                    | '>'
                    | '='
                    | '!'
                    | '%'
                    | '@'
                    | '`'
                    | '"'
                    | '\''
                    | '~'
                    | '\t'
            )
        })
        || string.starts_with("...")
        || string.contains(|c: char| {
            matches!(c, ':'
                | '{'
                | '}'
                | '['
                | ']'
                | ','
                | '#'
                | '`'
                | '\"'
                | '\''
                | '\\'
                | '\u{FEFF}'
                | '\0'..='\x06'
                | '\t'
                | '\n'
                | '\r'
                | '\x0e'..='\x1a'
                | '\x1c'..='\x1f')
        })
        || [
            "null", "Null", "NULL", "~", "true", "True", "TRUE", "false", "False", "FALSE",
            "yes", "Yes", "YES", "no", "No", "NO", "on", "On", "ON", "off", "Off", "OFF",
        ]
        .contains(&string)
        || string.starts_with("0x")
        || string.starts_with("0o")
        || string.parse::<i64>().is_ok()
        || parse_core_schema_float(string).is_some()
}

/// Write `v` double-quoted, escaping everything YAML cannot hold literally.
fn escape_str(wr: &mut dyn fmt::Write, v: &str) -> fmt::Result {
    wr.write_char('"')?;

    let mut start = 0;
    for (i, byte) in v.bytes().enumerate() {
        let escaped = match byte {
            b'"' => "\\\"",
            b'\\' => "\\\\",
            b'\x00' => "\\0",
            b'\x01' => "\\u0001",
            b'\x02' => "\\u0002",
            b'\x03' => "\\u0003",
            b'\x04' => "\\u0004",
            b'\x05' => "\\u0005",
            b'\x06' => "\\u0006",
            b'\x07' => "\\a",
            b'\x08' => "\\b",
            b'\t' => "\\t",
            b'\n' => "\\n",
            b'\x0b' => "\\v",
            b'\x0c' => "\\f",
            b'\r' => "\\r",
            b'\x0e' => "\\u000e",
            b'\x0f' => "\\u000f",
            b'\x10' => "\\u0010",
            b'\x11' => "\\u0011",
            b'\x12' => "\\u0012",
            b'\x13' => "\\u0013",
            b'\x14' => "\\u0014",
            b'\x15' => "\\u0015",
            b'\x16' => "\\u0016",
            b'\x17' => "\\u0017",
            b'\x18' => "\\u0018",
            b'\x19' => "\\u0019",
            b'\x1a' => "\\u001a",
            b'\x1b' => "\\e",
            b'\x1c' => "\\u001c",
            b'\x1d' => "\\u001d",
            b'\x1e' => "\\u001e",
            b'\x1f' => "\\u001f",
            b'\x7f' => "\\u007f",
            _ => continue,
        };

        if start < i {
            wr.write_str(&v[start..i])?;
        }
        wr.write_str(escaped)?;
        start = i + 1;
    }

    if start != v.len() {
        wr.write_str(&v[start..])?;
    }

    wr.write_char('"')
}

#[cfg(test)]
mod test {
    use super::needs_quotes;

    #[test]
    fn quoting_catches_schema_lookalikes() {
        assert!(needs_quotes(""));
        assert!(needs_quotes("true"));
        assert!(needs_quotes("0x1F"));
        assert!(needs_quotes("0o17"));
        assert!(needs_quotes("12"));
        assert!(needs_quotes("+.inf"));
        assert!(needs_quotes(".nan"));
        assert!(needs_quotes("a: b"));
        assert!(needs_quotes("..."));
        assert!(needs_quotes("a#b"));
        assert!(needs_quotes("[x]"));
        assert!(needs_quotes(" padded "));
        assert!(!needs_quotes("plain words"));
        assert!(!needs_quotes("v1.2.3"));
    }
}
