//! YAML 1.2 reading and writing in pure Rust.
//!
//! Documents are read into a tree of [`Node`]s: scalars resolved against the
//! core schema, sequences in source order and mappings that keep their
//! insertion order. Anchors, aliases and tags are honored while reading, and
//! a block-style serializer turns trees back into text.
//!
//! # Examples
//!
//! ```
//! let doc = citrine::deserialize("
//! name: Ogre
//! position: [0, 5, 0]
//! damage: 10
//! ").unwrap();
//!
//! assert_eq!(doc["name"].as_str().unwrap(), "Ogre");
//! assert_eq!(doc["position"][1].as_integer().unwrap(), 5);
//!
//! let out = citrine::serialize(&doc).unwrap();
//! assert_eq!(citrine::deserialize(&out).unwrap(), doc);
//! ```

#![warn(missing_docs, clippy::pedantic)]

mod deserializer;
mod error;
mod index;
mod iter;
mod node;
mod scalar;
mod serializer;
mod value;

pub use crate::deserializer::{
    deserialize, deserialize_docs, deserialize_docs_from_iter, deserialize_from_iter,
    deserialize_slice,
};
pub use crate::error::{Error, Result};
pub use crate::index::Accessor;
pub use crate::iter::{Entry, NodeIter};
pub use crate::node::{Mapping, Node, NodeKind, Sequence};
pub use crate::scalar::Scalar;
pub use crate::serializer::{serialize, serialize_docs, Serializer};
pub use crate::value::FromNode;

// Re-export the pieces of the scanner that surface in our API, so that
// consumers can inspect parse errors without depending on the parser crate.
pub use citrine_parser::{Marker, ScanError, Span};
