//! The document tree.

use std::fmt;
use std::hash::{Hash, Hasher};

use hashlink::LinkedHashMap;
use ordered_float::OrderedFloat;

use crate::{Error, Result, Scalar};

/// The type contained in sequence nodes.
pub type Sequence = Vec<Node>;

/// The type contained in mapping nodes.
///
/// Iteration order matches the order of insertion into the map, which for
/// parsed documents is the order in which keys appear in the source.
pub type Mapping = LinkedHashMap<Node, Node>;

/// The discriminator of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A null node.
    Null,
    /// A boolean node.
    Boolean,
    /// An integer node.
    Integer,
    /// A floating point node.
    Float,
    /// A string node.
    String,
    /// A sequence node.
    Sequence,
    /// A mapping node.
    Mapping,
}

impl NodeKind {
    pub(crate) fn name(self) -> &'static str {
        match self {
            NodeKind::Null => "null",
            NodeKind::Boolean => "boolean",
            NodeKind::Integer => "integer",
            NodeKind::Float => "float",
            NodeKind::String => "string",
            NodeKind::Sequence => "sequence",
            NodeKind::Mapping => "mapping",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The value stored in a [`Node`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum NodeData {
    /// A scalar leaf.
    Scalar(Scalar),
    /// A sequence of nodes, in source order.
    Sequence(Sequence),
    /// An insertion-ordered mapping from nodes to nodes.
    Mapping(Mapping),
}

/// A node of a YAML document tree.
///
/// A node stores one of the eight kinds of values along with its optional
/// node properties: an anchor name, a tag name (kept exactly as it appeared
/// in the source) and a flag marking nodes that were produced by expanding
/// an alias.
///
/// Equality and hashing consider the stored value only. Properties do not
/// participate, so `&a 1` compares equal to `1`; whether a node carries a
/// property is observable through [`Node::has_anchor_name`] and
/// [`Node::has_tag_name`].
///
/// # Examples
///
/// ```
/// use citrine::Node;
///
/// let doc = citrine::deserialize("answer: 42").unwrap();
/// assert_eq!(doc["answer"].as_integer().unwrap(), 42);
/// assert!(doc.contains("answer"));
/// ```
#[derive(Debug, Clone)]
pub struct Node {
    data: NodeData,
    anchor_name: Option<String>,
    tag_name: Option<String>,
    alias: bool,
}

impl Default for Node {
    /// A default-constructed node is null.
    fn default() -> Self {
        Node::from_data(NodeData::Scalar(Scalar::Null))
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data.hash(state);
    }
}

impl Node {
    pub(crate) fn from_data(data: NodeData) -> Self {
        Node {
            data,
            anchor_name: None,
            tag_name: None,
            alias: false,
        }
    }

    pub(crate) fn data(&self) -> &NodeData {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }

    pub(crate) fn replace_data(&mut self, data: NodeData) {
        self.data = data;
    }

    // -----------------------------------------------------------------
    // Factories.

    /// Create a null node.
    #[must_use]
    pub fn null() -> Self {
        Node::default()
    }

    /// Create a boolean node.
    #[must_use]
    pub fn boolean(v: bool) -> Self {
        Node::from_data(NodeData::Scalar(Scalar::Boolean(v)))
    }

    /// Create an integer node.
    #[must_use]
    pub fn integer(v: i64) -> Self {
        Node::from_data(NodeData::Scalar(Scalar::Integer(v)))
    }

    /// Create a floating point node.
    #[must_use]
    pub fn float(v: f64) -> Self {
        Node::from_data(NodeData::Scalar(Scalar::Float(OrderedFloat(v))))
    }

    /// Create a string node.
    #[must_use]
    pub fn string(v: impl Into<String>) -> Self {
        Node::from_data(NodeData::Scalar(Scalar::String(v.into())))
    }

    /// Create an empty sequence node.
    #[must_use]
    pub fn sequence() -> Self {
        Node::from_data(NodeData::Sequence(Sequence::new()))
    }

    /// Create an empty mapping node.
    #[must_use]
    pub fn mapping() -> Self {
        Node::from_data(NodeData::Mapping(Mapping::new()))
    }

    /// Create a node referring to `anchor` by copying its value.
    ///
    /// The copy carries the anchor's name and has its alias flag set.
    ///
    /// # Errors
    /// Returns a domain error if `anchor` has no anchor name.
    pub fn alias_of(anchor: &Node) -> Result<Self> {
        if anchor.anchor_name.is_none() {
            return Err(Error::Domain(
                "cannot alias a node that has no anchor name".into(),
            ));
        }
        let mut node = anchor.clone();
        node.alias = true;
        Ok(node)
    }

    // -----------------------------------------------------------------
    // Kind inspection.

    /// Return the kind of the node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match &self.data {
            NodeData::Scalar(Scalar::Null) => NodeKind::Null,
            NodeData::Scalar(Scalar::Boolean(_)) => NodeKind::Boolean,
            NodeData::Scalar(Scalar::Integer(_)) => NodeKind::Integer,
            NodeData::Scalar(Scalar::Float(_)) => NodeKind::Float,
            NodeData::Scalar(Scalar::String(_)) => NodeKind::String,
            NodeData::Sequence(_) => NodeKind::Sequence,
            NodeData::Mapping(_) => NodeKind::Mapping,
        }
    }

    /// Return whether the node is null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.kind() == NodeKind::Null
    }

    /// Return whether the node holds a boolean.
    #[must_use]
    pub fn is_boolean(&self) -> bool {
        self.kind() == NodeKind::Boolean
    }

    /// Return whether the node holds an integer.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.kind() == NodeKind::Integer
    }

    /// Return whether the node holds a float.
    #[must_use]
    pub fn is_float(&self) -> bool {
        self.kind() == NodeKind::Float
    }

    /// Return whether the node holds a string.
    #[must_use]
    pub fn is_string(&self) -> bool {
        self.kind() == NodeKind::String
    }

    /// Return whether the node is a sequence.
    #[must_use]
    pub fn is_sequence(&self) -> bool {
        matches!(self.data, NodeData::Sequence(_))
    }

    /// Return whether the node is a mapping.
    #[must_use]
    pub fn is_mapping(&self) -> bool {
        matches!(self.data, NodeData::Mapping(_))
    }

    /// Return whether the node is a scalar (not a container).
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(self.data, NodeData::Scalar(_))
    }

    fn type_error(&self, expected: &'static str) -> Error {
        Error::Type {
            expected,
            found: self.kind().name(),
        }
    }

    // -----------------------------------------------------------------
    // Typed access.

    /// Return the boolean value of the node.
    ///
    /// # Errors
    /// Returns a type error if the node is not a boolean.
    pub fn as_boolean(&self) -> Result<bool> {
        match &self.data {
            NodeData::Scalar(Scalar::Boolean(v)) => Ok(*v),
            _ => Err(self.type_error("boolean")),
        }
    }

    /// Return the integer value of the node.
    ///
    /// # Errors
    /// Returns a type error if the node is not an integer.
    pub fn as_integer(&self) -> Result<i64> {
        match &self.data {
            NodeData::Scalar(Scalar::Integer(v)) => Ok(*v),
            _ => Err(self.type_error("integer")),
        }
    }

    /// Return the floating point value of the node.
    ///
    /// # Errors
    /// Returns a type error if the node is not a float.
    pub fn as_float(&self) -> Result<f64> {
        match &self.data {
            NodeData::Scalar(Scalar::Float(v)) => Ok(v.into_inner()),
            _ => Err(self.type_error("float")),
        }
    }

    /// Return the string value of the node.
    ///
    /// # Errors
    /// Returns a type error if the node is not a string.
    pub fn as_str(&self) -> Result<&str> {
        match &self.data {
            NodeData::Scalar(Scalar::String(v)) => Ok(v),
            _ => Err(self.type_error("string")),
        }
    }

    /// Return the sequence contained in the node.
    ///
    /// # Errors
    /// Returns a type error if the node is not a sequence.
    pub fn as_sequence(&self) -> Result<&Sequence> {
        match &self.data {
            NodeData::Sequence(v) => Ok(v),
            _ => Err(self.type_error("sequence")),
        }
    }

    /// Return the sequence contained in the node, mutably.
    ///
    /// # Errors
    /// Returns a type error if the node is not a sequence.
    pub fn as_sequence_mut(&mut self) -> Result<&mut Sequence> {
        let found = self.kind().name();
        match &mut self.data {
            NodeData::Sequence(v) => Ok(v),
            _ => Err(Error::Type {
                expected: "sequence",
                found,
            }),
        }
    }

    /// Return the mapping contained in the node.
    ///
    /// # Errors
    /// Returns a type error if the node is not a mapping.
    pub fn as_mapping(&self) -> Result<&Mapping> {
        match &self.data {
            NodeData::Mapping(v) => Ok(v),
            _ => Err(self.type_error("mapping")),
        }
    }

    /// Return the mapping contained in the node, mutably.
    ///
    /// # Errors
    /// Returns a type error if the node is not a mapping.
    pub fn as_mapping_mut(&mut self) -> Result<&mut Mapping> {
        let found = self.kind().name();
        match &mut self.data {
            NodeData::Mapping(v) => Ok(v),
            _ => Err(Error::Type {
                expected: "mapping",
                found,
            }),
        }
    }

    // -----------------------------------------------------------------
    // Container operations.

    /// Return the number of elements of a container node or the byte length
    /// of a string node.
    ///
    /// # Errors
    /// Returns a type error for the other kinds.
    pub fn size(&self) -> Result<usize> {
        match &self.data {
            NodeData::Sequence(v) => Ok(v.len()),
            NodeData::Mapping(v) => Ok(v.len()),
            NodeData::Scalar(Scalar::String(v)) => Ok(v.len()),
            _ => Err(self.type_error("sequence, mapping or string")),
        }
    }

    /// Return whether a container or string node is empty.
    ///
    /// # Errors
    /// Returns a type error for the other kinds.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.size()? == 0)
    }

    /// Return whether the node is a mapping containing `key`.
    ///
    /// Non-mapping nodes contain nothing.
    #[must_use]
    pub fn contains(&self, key: impl Into<Node>) -> bool {
        match &self.data {
            NodeData::Mapping(map) => map.contains_key(&key.into()),
            _ => false,
        }
    }

    /// Append `value` to a sequence node.
    ///
    /// # Errors
    /// Returns a type error if the node is not a sequence.
    pub fn push(&mut self, value: impl Into<Node>) -> Result<()> {
        self.as_sequence_mut()?.push(value.into());
        Ok(())
    }

    /// Insert `value` under `key` in a mapping node.
    ///
    /// An existing entry for an equal key is updated in place, keeping its
    /// position; the previous value is returned.
    ///
    /// # Errors
    /// Returns a type error if the node is not a mapping.
    pub fn insert(&mut self, key: impl Into<Node>, value: impl Into<Node>) -> Result<Option<Node>> {
        let key = key.into();
        let value = value.into();
        let map = self.as_mapping_mut()?;
        if let Some(slot) = map.get_mut(&key) {
            return Ok(Some(std::mem::replace(slot, value)));
        }
        map.insert(key, value);
        Ok(None)
    }

    // -----------------------------------------------------------------
    // Node properties.

    /// Attach an anchor name to the node, making it an anchor definition.
    ///
    /// A previously attached name is replaced.
    ///
    /// # Errors
    /// Returns a domain error if `name` is empty.
    pub fn add_anchor_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::Domain("an anchor name must not be empty".into()));
        }
        self.anchor_name = Some(name);
        Ok(())
    }

    /// Attach a tag name to the node.
    ///
    /// A previously attached name is replaced.
    ///
    /// # Errors
    /// Returns a domain error if `name` is empty.
    pub fn add_tag_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::Domain("a tag name must not be empty".into()));
        }
        self.tag_name = Some(name);
        Ok(())
    }

    /// Return whether the node has an anchor name.
    #[must_use]
    pub fn has_anchor_name(&self) -> bool {
        self.anchor_name.is_some()
    }

    /// Return the anchor name of the node, if any.
    #[must_use]
    pub fn anchor_name(&self) -> Option<&str> {
        self.anchor_name.as_deref()
    }

    /// Return whether the node has a tag name.
    #[must_use]
    pub fn has_tag_name(&self) -> bool {
        self.tag_name.is_some()
    }

    /// Return the tag name of the node, if any, spelled as in the source.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        self.tag_name.as_deref()
    }

    /// Return whether the node was produced by expanding an alias.
    ///
    /// Alias nodes hold a copy of the anchored value; the anchor name
    /// identifies the referenced anchor.
    #[must_use]
    pub fn is_alias(&self) -> bool {
        self.alias
    }

    pub(crate) fn mark_alias(&mut self, name: String) {
        self.anchor_name = Some(name);
        self.alias = true;
    }
}

impl From<Scalar> for Node {
    fn from(v: Scalar) -> Self {
        Node::from_data(NodeData::Scalar(v))
    }
}

impl From<bool> for Node {
    fn from(v: bool) -> Self {
        Node::boolean(v)
    }
}

impl From<i64> for Node {
    fn from(v: i64) -> Self {
        Node::integer(v)
    }
}

impl From<f64> for Node {
    fn from(v: f64) -> Self {
        Node::float(v)
    }
}

impl From<&str> for Node {
    fn from(v: &str) -> Self {
        Node::string(v)
    }
}

impl From<String> for Node {
    fn from(v: String) -> Self {
        Node::string(v)
    }
}

impl From<Sequence> for Node {
    fn from(v: Sequence) -> Self {
        Node::from_data(NodeData::Sequence(v))
    }
}

impl From<Mapping> for Node {
    fn from(v: Mapping) -> Self {
        Node::from_data(NodeData::Mapping(v))
    }
}
