//! An [`Input`] adapting an arbitrary character iterator.

use arraydeque::ArrayDeque;

use crate::input::Input;

/// The size of the [`BufferedInput`] ring.
///
/// The ring is statically allocated so that consuming or buffering a
/// character never reallocates. The largest lookahead the scanner performs is
/// 10 characters (a `\UHHHHHHHH` escape), so the size must be at least that.
const BUFFER_LEN: usize = 16;

/// A wrapper around an [`Iterator`] of [`char`]s with a lookahead ring.
///
/// The scanner frequently peeks several characters ahead. Iterators cannot be
/// peeked at arbitrary depth, so this adapter keeps the characters that have
/// been pulled but not yet consumed in a fixed-size deque.
pub struct BufferedInput<T: Iterator<Item = char>> {
    /// The iterator source.
    input: T,
    /// Characters pulled from `input` but not yet consumed.
    buffer: ArrayDeque<char, BUFFER_LEN>,
    /// Whether a byte-order-mark has been checked for and removed.
    bom_checked: bool,
}

impl<T: Iterator<Item = char>> BufferedInput<T> {
    /// Create a new [`BufferedInput`] with the given source.
    pub fn new(input: T) -> Self {
        Self {
            input,
            buffer: ArrayDeque::default(),
            bom_checked: false,
        }
    }

    fn pull(&mut self) -> char {
        if !self.bom_checked {
            self.bom_checked = true;
            return match self.input.next() {
                Some('\u{FEFF}') => self.input.next().unwrap_or('\0'),
                Some(c) => c,
                None => '\0',
            };
        }
        self.input.next().unwrap_or('\0')
    }
}

impl<T: Iterator<Item = char>> Input for BufferedInput<T> {
    #[inline]
    fn lookahead(&mut self, count: usize) {
        while self.buffer.len() < count {
            let c = self.pull();
            self.buffer.push_back(c).expect("lookahead beyond capacity");
        }
    }

    #[inline]
    fn buflen(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    fn bufmaxlen(&self) -> usize {
        BUFFER_LEN
    }

    #[inline]
    fn skip(&mut self) {
        self.buffer.pop_front();
    }

    #[inline]
    fn skip_n(&mut self, count: usize) {
        debug_assert!(count <= self.buffer.len());
        self.buffer.drain(0..count.min(self.buffer.len()));
    }

    #[inline]
    fn peek(&self) -> char {
        self.buffer.front().copied().unwrap_or('\0')
    }

    #[inline]
    fn peek_nth(&self, n: usize) -> char {
        self.buffer.get(n).copied().unwrap_or('\0')
    }
}
