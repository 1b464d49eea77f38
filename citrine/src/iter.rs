//! A unified iterator over container nodes.

use std::ops::Deref;

use crate::node::NodeData;
use crate::{Error, Node, Result};

/// An iterator over the elements of a sequence or mapping node.
///
/// The two container kinds are unified behind a single item type,
/// [`Entry`]: iterating a sequence yields its elements, iterating a
/// mapping yields its values, and [`Entry::key`] gives access to the
/// mapping key where one exists.
pub struct NodeIter<'a> {
    inner: Inner<'a>,
}

enum Inner<'a> {
    Sequence(std::slice::Iter<'a, Node>),
    Mapping(hashlink::linked_hash_map::Iter<'a, Node, Node>),
}

/// One element yielded by a [`NodeIter`].
///
/// Dereferences to the element value.
pub struct Entry<'a> {
    key: Option<&'a Node>,
    value: &'a Node,
}

impl<'a> Entry<'a> {
    /// Return the mapping key of this entry.
    ///
    /// # Errors
    /// Returns a type error when iterating a sequence, whose entries have no
    /// keys.
    pub fn key(&self) -> Result<&'a Node> {
        self.key.ok_or(Error::Type {
            expected: "mapping entry",
            found: "sequence entry",
        })
    }

    /// Return the element value.
    #[must_use]
    pub fn value(&self) -> &'a Node {
        self.value
    }
}

impl Deref for Entry<'_> {
    type Target = Node;

    fn deref(&self) -> &Node {
        self.value
    }
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = Entry<'a>;

    fn next(&mut self) -> Option<Entry<'a>> {
        match &mut self.inner {
            Inner::Sequence(it) => it.next().map(|value| Entry { key: None, value }),
            Inner::Mapping(it) => it.next().map(|(key, value)| Entry {
                key: Some(key),
                value,
            }),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            Inner::Sequence(it) => it.size_hint(),
            Inner::Mapping(it) => it.size_hint(),
        }
    }
}

impl Node {
    /// Iterate over the elements of a container node.
    ///
    /// # Errors
    /// Returns a type error if the node is a scalar.
    pub fn iter(&self) -> Result<NodeIter<'_>> {
        match self.data() {
            NodeData::Sequence(seq) => Ok(NodeIter {
                inner: Inner::Sequence(seq.iter()),
            }),
            NodeData::Mapping(map) => Ok(NodeIter {
                inner: Inner::Mapping(map.iter()),
            }),
            NodeData::Scalar(_) => Err(Error::Type {
                expected: "sequence or mapping",
                found: self.kind().name(),
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::Node;

    #[test]
    fn sequence_iteration() {
        let mut seq = Node::sequence();
        seq.push(1i64).unwrap();
        seq.push(2i64).unwrap();
        let values: Vec<i64> = seq
            .iter()
            .unwrap()
            .map(|e| e.as_integer().unwrap())
            .collect();
        assert_eq!(values, [1, 2]);
        assert!(seq.iter().unwrap().next().unwrap().key().is_err());
    }

    #[test]
    fn mapping_iteration_preserves_order() {
        let mut map = Node::mapping();
        map.insert("b", 1i64).unwrap();
        map.insert("a", 2i64).unwrap();
        let keys: Vec<String> = map
            .iter()
            .unwrap()
            .map(|e| e.key().unwrap().as_str().unwrap().to_owned())
            .collect();
        assert_eq!(keys, ["b", "a"]);
    }

    #[test]
    fn scalars_are_not_iterable() {
        assert!(Node::integer(3).iter().is_err());
    }
}
