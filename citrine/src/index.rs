//! Indexing into container nodes.

use std::ops::{Index, IndexMut};

use crate::node::NodeData;
use crate::{Error, Node, Result};

/// An index into a container node: a sequence position or a mapping key.
pub enum Accessor {
    /// A position in a sequence.
    Position(usize),
    /// A key in a mapping.
    Key(Node),
}

impl From<usize> for Accessor {
    fn from(v: usize) -> Self {
        Accessor::Position(v)
    }
}

impl From<&str> for Accessor {
    fn from(v: &str) -> Self {
        Accessor::Key(Node::string(v))
    }
}

impl From<String> for Accessor {
    fn from(v: String) -> Self {
        Accessor::Key(Node::string(v))
    }
}

impl From<Node> for Accessor {
    fn from(v: Node) -> Self {
        Accessor::Key(v)
    }
}

impl From<&Node> for Accessor {
    fn from(v: &Node) -> Self {
        Accessor::Key(v.clone())
    }
}

impl Node {
    /// Access a container element, if present.
    ///
    /// Returns [`None`] if the node is not indexable by the given accessor or
    /// the element does not exist.
    #[must_use]
    pub fn get(&self, accessor: impl Into<Accessor>) -> Option<&Node> {
        match (accessor.into(), self.data()) {
            (Accessor::Position(idx), NodeData::Sequence(seq)) => seq.get(idx),
            (Accessor::Key(key), NodeData::Mapping(map)) => map.get(&key),
            _ => None,
        }
    }

    /// Access a container element mutably, if present.
    #[must_use]
    pub fn get_mut(&mut self, accessor: impl Into<Accessor>) -> Option<&mut Node> {
        match (accessor.into(), self.data_mut()) {
            (Accessor::Position(idx), NodeData::Sequence(seq)) => seq.get_mut(idx),
            (Accessor::Key(key), NodeData::Mapping(map)) => map.get_mut(&key),
            _ => None,
        }
    }

    /// Access a container element, with strict error reporting.
    ///
    /// # Errors
    /// Returns a type error if the node cannot be indexed by the given
    /// accessor, and an out-of-range error if the element does not exist.
    pub fn at(&self, accessor: impl Into<Accessor>) -> Result<&Node> {
        match (accessor.into(), self.data()) {
            (Accessor::Position(idx), NodeData::Sequence(seq)) => {
                let len = seq.len();
                seq.get(idx).ok_or_else(|| {
                    Error::OutOfRange(format!(
                        "sequence index {idx} is out of range for length {len}"
                    ))
                })
            }
            (Accessor::Key(key), NodeData::Mapping(map)) => map
                .get(&key)
                .ok_or_else(|| Error::OutOfRange("no such key in mapping".into())),
            (Accessor::Position(_), _) => Err(Error::Type {
                expected: "sequence",
                found: self.kind().name(),
            }),
            (Accessor::Key(_), _) => Err(Error::Type {
                expected: "mapping",
                found: self.kind().name(),
            }),
        }
    }
}

impl<A: Into<Accessor>> Index<A> for Node {
    type Output = Node;

    /// Access a container element.
    ///
    /// # Panics
    /// Panics if the node cannot be indexed by the given accessor or the
    /// element does not exist. Use [`Node::get`] or [`Node::at`] for
    /// non-panicking access.
    fn index(&self, accessor: A) -> &Node {
        match self.at(accessor) {
            Ok(node) => node,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<A: Into<Accessor>> IndexMut<A> for Node {
    /// Access a container element mutably.
    ///
    /// Indexing a mapping with a key that is not present inserts a null value
    /// under that key and returns it.
    ///
    /// # Panics
    /// Panics if the node cannot be indexed by the given accessor, or if a
    /// sequence position is out of range.
    fn index_mut(&mut self, accessor: A) -> &mut Node {
        match accessor.into() {
            Accessor::Position(idx) => {
                let seq = match self.as_sequence_mut() {
                    Ok(seq) => seq,
                    Err(e) => panic!("{e}"),
                };
                let len = seq.len();
                match seq.get_mut(idx) {
                    Some(node) => node,
                    None => panic!("sequence index {idx} is out of range for length {len}"),
                }
            }
            Accessor::Key(key) => {
                let map = match self.as_mapping_mut() {
                    Ok(map) => map,
                    Err(e) => panic!("{e}"),
                };
                map.entry(key).or_insert_with(Node::null)
            }
        }
    }
}
