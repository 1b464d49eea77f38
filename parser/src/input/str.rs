//! An [`Input`] borrowing its characters from a `&str`.

use crate::input::Input;

/// A scanner input that uses a `&str` as its source.
#[allow(clippy::module_name_repetitions)]
pub struct StrInput<'a> {
    /// The remaining input.
    buffer: &'a str,
    /// The number of characters the scanner asked us to look ahead.
    ///
    /// The whole input is available at all times, but [`Input::buflen`] must
    /// report the amount requested through [`Input::lookahead`].
    lookahead: usize,
}

impl<'a> StrInput<'a> {
    /// Create a new [`StrInput`] over the given string.
    ///
    /// A leading byte-order-mark, if any, is stripped.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            buffer: input.strip_prefix('\u{FEFF}').unwrap_or(input),
            lookahead: 0,
        }
    }
}

impl Input for StrInput<'_> {
    #[inline]
    fn lookahead(&mut self, count: usize) {
        // Everything is already in memory. `'\0'`-padding past the end is
        // performed by the character-retrieving functions.
        self.lookahead = self.lookahead.max(count);
    }

    #[inline]
    fn buflen(&self) -> usize {
        self.lookahead
    }

    #[inline]
    fn bufmaxlen(&self) -> usize {
        BUFFER_LEN
    }

    #[inline]
    fn skip(&mut self) {
        let mut chars = self.buffer.chars();
        if chars.next().is_some() {
            self.buffer = chars.as_str();
        }
        self.lookahead = self.lookahead.saturating_sub(1);
    }

    #[inline]
    fn skip_n(&mut self, count: usize) {
        let mut chars = self.buffer.chars();
        for _ in 0..count {
            if chars.next().is_none() {
                break;
            }
        }
        self.buffer = chars.as_str();
        self.lookahead = self.lookahead.saturating_sub(count);
    }

    #[inline]
    fn peek(&self) -> char {
        self.buffer.chars().next().unwrap_or('\0')
    }

    #[inline]
    fn peek_nth(&self, n: usize) -> char {
        self.buffer.chars().nth(n).unwrap_or('\0')
    }
}

/// The buffer size reported to the scanner.
///
/// No buffer of this size is ever allocated; the whole input is available.
/// The value bounds how far a single [`Input::lookahead`] may reach, which in
/// turn bounds the scratch buffers the scanner allocates, so it must not be
/// made arbitrarily large.
const BUFFER_LEN: usize = 16;
