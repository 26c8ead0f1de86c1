//! Character scanner over source text.
use itertools::{multipeek, MultiPeek};
use std::str::CharIndices;

/// Placeholder character returned when the cursor is past the end.
///
/// Source may contain a literal `'\0'`, so [`Cursor::at_end`] is the
/// authority on whether the end was actually reached.
pub(crate) const EOF_CHAR: char = '\0';

pub(crate) struct Cursor<'a> {
    /// Iterator over UTF-8 encoded source code.
    ///
    /// Peeking on a `MultiPeek` advances an internal peek cursor, so every
    /// lookahead here resets it first. Consuming with `next()` resets it too.
    chars: MultiPeek<CharIndices<'a>>,
    /// Byte offset and value of the current character.
    current: (usize, char),
    len: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            chars: multipeek(text.char_indices()),
            current: (0, EOF_CHAR),
            len: text.len(),
        }
    }

    /// Advance the cursor and return the new current character.
    pub(crate) fn next(&mut self) -> char {
        self.current = match self.chars.next() {
            Some(pair) => pair,
            // There is no end-of-file character, so the position
            // is set to the size of the source.
            None => (self.len, EOF_CHAR),
        };
        self.current.1
    }

    #[inline]
    pub(crate) fn current(&self) -> char {
        self.current.1
    }

    /// Character after the current one, without consuming it.
    pub(crate) fn peek(&mut self) -> char {
        self.chars.reset_peek();
        let c = self.chars.peek().map(|(_, c)| *c).unwrap_or(EOF_CHAR);
        self.chars.reset_peek();
        c
    }

    /// Byte offset of the current character.
    #[inline]
    pub(crate) fn offset(&self) -> u32 {
        self.current.0 as u32
    }

    /// Byte offset just past the current character.
    pub(crate) fn peek_offset(&self) -> u32 {
        if self.at_end() {
            self.len as u32
        } else {
            (self.current.0 + self.current.1.len_utf8()) as u32
        }
    }

    #[inline]
    pub(crate) fn at_end(&self) -> bool {
        self.current.0 >= self.len
    }
}
