//! Debug helpers.
//!
//! This module exports the `debug_print!` macro, which forwards to
//! `eprintln!` when the `debug_prints` feature is enabled and compiles to
//! nothing otherwise.

#[cfg(feature = "debug_prints")]
macro_rules! debug_print {
    ($($arg:tt)*) => {
        eprintln!($($arg)*)
    };
}

#[cfg(not(feature = "debug_prints"))]
macro_rules! debug_print {
    ($($arg:tt)*) => {};
}
