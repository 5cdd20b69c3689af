//! Forward-only reader over the symbols of a string
//!
//! A symbol is one `char`. The reader keeps three indexes in lock step:
//!
//! - the symbol index, used by the reader's own slicing operations;
//! - the code-point index, which counts symbols at or above U+10000 twice
//!   (the UTF-16 convention editors and browser tooling report positions in);
//! - the byte offset into the UTF-8 source, which is what Rust string slicing
//!   and splicing use.
//!
//! Only [`StringReader::advance`] moves the indexes. Everything else goes
//! through it or through a [`Bookmark`].

use std::fmt;

use thiserror::Error;

/// Errors raised by the reader itself
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReaderError {
    /// A read was attempted with nothing left
    #[error("can't read at {}: end of input", .at.code_point())]
    EndOfInput { at: Bookmark },

    /// `expect` did not find what it was told to
    #[error("expected {expected} at {} but got {}", .at.code_point(), found_str(.found))]
    UnexpectedInput {
        expected: String,
        found: Option<char>,
        at: Bookmark,
    },
}

fn found_str(found: &Option<char>) -> String {
    match found {
        Some(c) => format!("'{}'", c),
        None => "EOF".to_string(),
    }
}

/// A saved reader position
///
/// Only produced by [`StringReader::bookmark`]; pass it back to
/// [`StringReader::restore`] to rewind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Bookmark {
    symbol: usize,
    code_point: usize,
    byte: usize,
}

impl Bookmark {
    pub fn symbol(&self) -> usize {
        self.symbol
    }

    pub fn code_point(&self) -> usize {
        self.code_point
    }

    pub fn byte(&self) -> usize {
        self.byte
    }
}

/// Something a single symbol can be tested against
pub trait Pattern {
    fn matches(&self, c: char) -> bool;

    /// Human readable form used in `UnexpectedInput` errors
    fn describe(&self) -> String;
}

impl Pattern for char {
    fn matches(&self, c: char) -> bool {
        *self == c
    }

    fn describe(&self) -> String {
        format!("'{}'", self)
    }
}

/// Symbol classes used by the token grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Any unicode whitespace
    Whitespace,
    /// ASCII alphanumerics, `_`, `-` and `.`
    NameChar,
    /// `"` or `'`
    Quote,
    /// `;` or `:`
    Terminator,
    /// Anything except `,` and `)`
    UnquotedArg,
    /// Anything except the given delimiter and backslash
    QuotedBody(char),
}

impl Pattern for CharClass {
    fn matches(&self, c: char) -> bool {
        match self {
            CharClass::Whitespace => c.is_whitespace(),
            CharClass::NameChar => c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'),
            CharClass::Quote => matches!(c, '"' | '\''),
            CharClass::Terminator => matches!(c, ';' | ':'),
            CharClass::UnquotedArg => !matches!(c, ',' | ')'),
            CharClass::QuotedBody(delim) => c != *delim && c != '\\',
        }
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharClass::Whitespace => write!(f, "whitespace"),
            CharClass::NameChar => write!(f, "name character [a-zA-Z0-9_.-]"),
            CharClass::Quote => write!(f, "quote"),
            CharClass::Terminator => write!(f, "';' or ':'"),
            CharClass::UnquotedArg => write!(f, "argument character"),
            CharClass::QuotedBody(delim) => write!(f, "anything but '{}' or '\\'", delim),
        }
    }
}

/// Bookmarkable reader over a string's symbols
#[derive(Debug, Clone)]
pub struct StringReader<'a> {
    source: &'a str,
    symbols: Vec<char>,
    pos: Bookmark,
}

impl<'a> StringReader<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            symbols: source.chars().collect(),
            pos: Bookmark::default(),
        }
    }

    pub fn symbol_index(&self) -> usize {
        self.pos.symbol
    }

    pub fn code_point_index(&self) -> usize {
        self.pos.code_point
    }

    pub fn byte_index(&self) -> usize {
        self.pos.byte
    }

    pub fn is_empty(&self) -> bool {
        self.pos.symbol >= self.symbols.len()
    }

    /// True if at least `n` symbols remain unread
    pub fn have_enough(&self, n: usize) -> bool {
        self.pos.symbol + n <= self.symbols.len()
    }

    pub fn reset(&mut self) {
        self.pos = Bookmark::default();
    }

    pub fn bookmark(&self) -> Bookmark {
        self.pos
    }

    pub fn restore(&mut self, bookmark: Bookmark) {
        self.pos = bookmark;
    }

    /// The next symbol without consuming it
    pub fn peek(&self) -> Option<char> {
        self.symbols.get(self.pos.symbol).copied()
    }

    /// True if the next symbol matches `pattern`; never consumes
    pub fn matches(&self, pattern: &impl Pattern) -> bool {
        self.peek().is_some_and(|c| pattern.matches(c))
    }

    pub fn read(&mut self) -> Result<char, ReaderError> {
        match self.peek() {
            Some(c) => {
                self.advance(c);
                Ok(c)
            }
            None => Err(ReaderError::EndOfInput { at: self.pos }),
        }
    }

    /// Consume and return the next symbol if it matches
    pub fn accept(&mut self, pattern: &impl Pattern) -> Option<char> {
        let c = self.peek().filter(|c| pattern.matches(*c))?;
        self.advance(c);
        Some(c)
    }

    /// Like [`accept`](Self::accept) but a miss is an error
    pub fn expect(&mut self, pattern: &impl Pattern) -> Result<char, ReaderError> {
        self.accept(pattern)
            .ok_or_else(|| ReaderError::UnexpectedInput {
                expected: pattern.describe(),
                found: self.peek(),
                at: self.pos,
            })
    }

    /// Consume the longest run of matching symbols; may be empty
    pub fn read_while(&mut self, pattern: &impl Pattern) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek().filter(|c| pattern.matches(*c)) {
            self.advance(c);
        }
        self.slice_between(start, self.pos)
    }

    pub fn skip_whitespace(&mut self) -> &'a str {
        self.read_while(&CharClass::Whitespace)
    }

    /// Advance until the next symbol matches, leaving it unread.
    ///
    /// Returns false and leaves the reader at the end when nothing matches.
    pub fn seek(&mut self, pattern: &impl Pattern) -> bool {
        while let Some(c) = self.peek() {
            if pattern.matches(c) {
                return true;
            }
            self.advance(c);
        }
        false
    }

    /// Symbols in `[start, end)` by symbol index, clamped to the source
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.symbols.len());
        let start = start.min(end);
        self.symbols[start..end].iter().collect()
    }

    /// Source text between two bookmarks
    pub fn slice_between(&self, start: Bookmark, end: Bookmark) -> &'a str {
        &self.source[start.byte..end.byte]
    }

    fn advance(&mut self, c: char) {
        self.pos.symbol += 1;
        self.pos.code_point += c.len_utf16();
        self.pos.byte += c.len_utf8();
    }
}
