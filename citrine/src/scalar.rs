//! The resolved value of a scalar node.

use ordered_float::OrderedFloat;

use citrine_parser::parse_core_schema_float;

/// The resolved value of a scalar YAML node.
///
/// Scalar nodes are the leaf nodes of a document. Floats are wrapped in
/// [`OrderedFloat`] so that scalars are usable as mapping keys; refer to its
/// documentation for the comparison semantics of `NaN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scalar {
    /// A null value.
    Null,
    /// A boolean value.
    Boolean(bool),
    /// A signed integer value.
    Integer(i64),
    /// A floating point value.
    Float(OrderedFloat<f64>),
    /// A string.
    String(String),
}

impl Scalar {
    /// Parse `text` as a null scalar of the core schema.
    #[must_use]
    pub fn parse_null(text: &str) -> Option<Scalar> {
        match text {
            "~" | "null" | "Null" | "NULL" | "" => Some(Scalar::Null),
            _ => None,
        }
    }

    /// Parse `text` as a boolean scalar of the core schema.
    #[must_use]
    pub fn parse_boolean(text: &str) -> Option<Scalar> {
        match text {
            "true" | "True" | "TRUE" => Some(Scalar::Boolean(true)),
            "false" | "False" | "FALSE" => Some(Scalar::Boolean(false)),
            _ => None,
        }
    }

    /// Parse `text` as an integer scalar of the core schema.
    ///
    /// Handles the decimal, `0o` octal and `0x` hexadecimal notations.
    #[must_use]
    pub fn parse_integer(text: &str) -> Option<Scalar> {
        if let Some(digits) = text.strip_prefix("0x") {
            i64::from_str_radix(digits, 16).ok().map(Scalar::Integer)
        } else if let Some(digits) = text.strip_prefix("0o") {
            i64::from_str_radix(digits, 8).ok().map(Scalar::Integer)
        } else {
            text.parse::<i64>().ok().map(Scalar::Integer)
        }
    }

    /// Parse `text` as a floating point scalar of the core schema.
    #[must_use]
    pub fn parse_float(text: &str) -> Option<Scalar> {
        parse_core_schema_float(text).map(|f| Scalar::Float(OrderedFloat(f)))
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Boolean(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Integer(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(OrderedFloat(v))
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::String(v.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::String(v)
    }
}
