//! YAML tokenizer in pure Rust.
//!
//! **If you want to read YAML documents into a tree or write them back out,
//! use `citrine` instead of `citrine-parser`. This crate contains only the
//! scanner.**
//!
//! The scanner turns a stream of characters into a stream of YAML tokens:
//! structural indicators, directives, node properties and fully classified
//! scalars. It is the low-level half of the library; the `citrine` crate
//! drives it to build documents.
//!
//! # Features
//!
//! #### `debug_prints`
//! Enables debug prints in the scanner. Do not enable if you are consuming
//! the crate rather than working on it as this can significantly decrease
//! performance.

#![warn(missing_docs, clippy::pedantic)]

mod char_traits;
#[macro_use]
mod debug;
pub mod input;
mod scanner;

pub use crate::input::{str::StrInput, BufferedInput, Input};
pub use crate::scanner::{
    parse_core_schema_float, Marker, ScanError, ScanResult, Scanner, Span, Token, TokenType,
    YamlVersion,
};
