//! Coercion from nodes into plain Rust values.

use crate::node::NodeData;
use crate::{Error, Node, Result, Scalar};

/// A type that a [`Node`] can be coerced into.
///
/// This backs [`Node::get_value`]. Numeric conversions are checked: integer
/// narrowing fails when the value does not fit the target, and floats convert
/// to integers only when they are integral and in range. Non-integral floats
/// are rejected as out of range rather than truncated.
pub trait FromNode: Sized {
    /// Build a value of this type from a node.
    ///
    /// # Errors
    /// Returns a type error when the node kind does not match and an
    /// out-of-range error when a numeric value does not fit.
    fn from_node(node: &Node) -> Result<Self>;
}

impl Node {
    /// Coerce the node into a plain Rust value.
    ///
    /// ```
    /// let doc = citrine::deserialize("count: 3").unwrap();
    /// let count: u8 = doc["count"].get_value().unwrap();
    /// assert_eq!(count, 3);
    /// ```
    ///
    /// # Errors
    /// See [`FromNode::from_node`].
    pub fn get_value<T: FromNode>(&self) -> Result<T> {
        T::from_node(self)
    }
}

/// Extract an `i64` from an integer node, or from a float node holding an
/// integral value.
fn integer_value(node: &Node) -> Result<i64> {
    match node.data() {
        NodeData::Scalar(Scalar::Integer(v)) => Ok(*v),
        NodeData::Scalar(Scalar::Float(f)) => {
            let f = f.into_inner();
            if f.fract() == 0.0 && f >= -(2f64.powi(63)) && f < 2f64.powi(63) {
                Ok(f as i64)
            } else {
                Err(Error::OutOfRange(format!(
                    "float {f} does not hold an integral value in range"
                )))
            }
        }
        _ => Err(Error::Type {
            expected: "integer",
            found: node.kind().name(),
        }),
    }
}

impl FromNode for bool {
    fn from_node(node: &Node) -> Result<Self> {
        node.as_boolean()
    }
}

impl FromNode for String {
    fn from_node(node: &Node) -> Result<Self> {
        node.as_str().map(str::to_owned)
    }
}

impl FromNode for f64 {
    fn from_node(node: &Node) -> Result<Self> {
        match node.data() {
            NodeData::Scalar(Scalar::Float(f)) => Ok(f.into_inner()),
            NodeData::Scalar(Scalar::Integer(v)) => Ok(*v as f64),
            _ => Err(Error::Type {
                expected: "float",
                found: node.kind().name(),
            }),
        }
    }
}

impl FromNode for f32 {
    fn from_node(node: &Node) -> Result<Self> {
        let wide = f64::from_node(node)?;
        if wide.is_finite() && wide.abs() > f64::from(f32::MAX) {
            return Err(Error::OutOfRange(format!(
                "float {wide} does not fit in an f32"
            )));
        }
        Ok(wide as f32)
    }
}

macro_rules! impl_from_node_for_int {
    ($($ty:ty),*) => {
        $(
            impl FromNode for $ty {
                fn from_node(node: &Node) -> Result<Self> {
                    let wide = integer_value(node)?;
                    <$ty>::try_from(wide).map_err(|_| {
                        Error::OutOfRange(format!(
                            "integer {wide} does not fit in a {}",
                            stringify!($ty)
                        ))
                    })
                }
            }
        )*
    };
}

impl_from_node_for_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl<T: FromNode> FromNode for Vec<T> {
    fn from_node(node: &Node) -> Result<Self> {
        node.as_sequence()?.iter().map(T::from_node).collect()
    }
}

impl<T: FromNode> FromNode for Option<T> {
    fn from_node(node: &Node) -> Result<Self> {
        if node.is_null() {
            Ok(None)
        } else {
            T::from_node(node).map(Some)
        }
    }
}
