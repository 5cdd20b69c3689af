//! Placeholder token scanner
//!
//! Grammar:
//!
//! ```text
//! TOKEN   := PREFIX ( PREFIX | NAME PARAMS? ) SUFFIX?
//! NAME    := { alpha-numeric | "_" | "-" | "." }
//! PARAMS  := "(" [ ARG { "," ARG } ] ")"
//! ARG     := '"' { any rune except '"' or '\' | '\"' | '\\' } '"'
//!          | "'" { any rune except "'" or '\' | "\'" | "\\" } "'"
//!          | { any rune except "," or ")" }
//! SUFFIX  := ";" | ":" | whitespace
//! ```
//!
//! Everything outside of tokens is opaque text and is skipped.

use std::ops::Range;

use crate::error::{Span, SyntaxError};
use crate::reader::{Bookmark, CharClass, StringReader};

/// Default placeholder prefix
pub const DEFAULT_PREFIX: char = '$';

/// A placeholder found in the source text
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Byte range of the whole token, suffix included
    pub span: Span,
    /// The same range in code points (UTF-16 units)
    pub code_points: Range<usize>,
    /// The same range in symbols
    pub symbols: Range<usize>,
    /// Exact source text of the token
    pub raw: String,
    /// Dot separated name split into segments; `[prefix]` for escapes
    pub path: Vec<String>,
    /// Arguments with quotes and escapes already processed
    pub args: Vec<String>,
    /// Terminator or whitespace consumed after the token body
    pub suffix: Option<char>,
    /// True for a doubled prefix
    pub escape: bool,
}

impl Token {
    /// The path joined back into its dotted form
    pub fn name(&self) -> String {
        self.path.join(".")
    }
}

/// Scans tokens out of a text one at a time.
///
/// Iteration stops after the first syntax error since every offset after a
/// malformed token is suspect.
#[derive(Debug, Clone)]
pub struct TokenScanner<'a> {
    reader: StringReader<'a>,
    prefix: char,
    failed: bool,
}

impl<'a> TokenScanner<'a> {
    pub fn new(source: &'a str, prefix: char) -> Self {
        Self {
            reader: StringReader::new(source),
            prefix,
            failed: false,
        }
    }

    /// Scan the next token, or `None` once no prefix remains
    pub fn scan_token(&mut self) -> Result<Option<Token>, SyntaxError> {
        if !self.reader.seek(&self.prefix) {
            return Ok(None);
        }

        let start = self.reader.bookmark();
        self.reader.read()?;

        if self.reader.accept(&self.prefix).is_some() {
            let suffix = self.scan_suffix();
            let path = vec![self.prefix.to_string()];
            return Ok(Some(self.finish(start, path, Vec::new(), suffix, true)));
        }

        let name = self.reader.read_while(&CharClass::NameChar);
        if name.is_empty() {
            return Err(SyntaxError::EmptyTokenName {
                prefix: self.prefix,
                symbols: self.symbols_from(start),
                position: start.code_point(),
            });
        }

        let path: Vec<String> = name.split('.').map(str::to_string).collect();
        if path.iter().any(String::is_empty) {
            return Err(SyntaxError::EmptyPathSegment {
                name: name.to_string(),
                symbols: self.symbols_from(start),
                position: start.code_point(),
            });
        }

        let args = self.scan_params(name, start)?;
        let suffix = self.scan_suffix();

        Ok(Some(self.finish(start, path, args, suffix, false)))
    }

    // PARAMS := [ "(" ARGS ")" ]
    fn scan_params(&mut self, name: &str, start: Bookmark) -> Result<Vec<String>, SyntaxError> {
        let mark = self.reader.bookmark();

        self.reader.skip_whitespace();
        if self.reader.accept(&'(').is_none() {
            self.reader.restore(mark);
            return Ok(Vec::new());
        }

        self.reader.skip_whitespace();
        if self.reader.accept(&')').is_some() {
            return Ok(Vec::new());
        }

        let mut args = Vec::new();
        loop {
            args.push(self.scan_arg(name, start)?);

            self.reader.skip_whitespace();
            if self.reader.accept(&',').is_none() {
                break;
            }
        }

        self.reader
            .expect(&')')
            .map_err(|source| SyntaxError::UnterminatedArgumentList {
                name: name.to_string(),
                symbols: self.symbols_from(start),
                position: start.code_point(),
                source,
            })?;

        Ok(args)
    }

    fn scan_arg(&mut self, name: &str, start: Bookmark) -> Result<String, SyntaxError> {
        self.reader.skip_whitespace();

        if let Some(delim) = self.reader.accept(&CharClass::Quote) {
            return self.scan_quoted_arg(delim, name, start);
        }

        let arg = self.reader.read_while(&CharClass::UnquotedArg).trim_end();
        if arg.is_empty() {
            return Err(SyntaxError::MissingArgument {
                name: name.to_string(),
                symbols: self.symbols_from(start),
                position: start.code_point(),
            });
        }

        Ok(arg.to_string())
    }

    fn scan_quoted_arg(
        &mut self,
        delim: char,
        name: &str,
        start: Bookmark,
    ) -> Result<String, SyntaxError> {
        let mut result = String::new();
        let mut pending_backslash = false;

        while !self.reader.is_empty() {
            if !pending_backslash {
                result.push_str(self.reader.read_while(&CharClass::QuotedBody(delim)));
                if self.reader.is_empty() {
                    break;
                }
            }

            match (pending_backslash, self.reader.read()?) {
                (true, c) => {
                    // `\\` and `\<delim>` collapse, anything else keeps its backslash
                    if c != delim && c != '\\' {
                        result.push('\\');
                    }
                    result.push(c);
                    pending_backslash = false;
                }
                (false, '\\') => pending_backslash = true,
                (false, _) => return Ok(result),
            }
        }

        Err(SyntaxError::UnterminatedQuotedArgument {
            name: name.to_string(),
            symbols: self.symbols_from(start),
            position: start.code_point(),
        })
    }

    // SUFFIX := ";" | ":" | whitespace
    fn scan_suffix(&mut self) -> Option<char> {
        let mark = self.reader.bookmark();

        self.reader.skip_whitespace();
        if let Some(c) = self.reader.accept(&CharClass::Terminator) {
            return Some(c);
        }

        self.reader.restore(mark);
        self.reader.accept(&CharClass::Whitespace)
    }

    fn finish(
        &self,
        start: Bookmark,
        path: Vec<String>,
        args: Vec<String>,
        suffix: Option<char>,
        escape: bool,
    ) -> Token {
        let end = self.reader.bookmark();
        let token = Token {
            span: start.byte()..end.byte(),
            code_points: start.code_point()..end.code_point(),
            symbols: start.symbol()..end.symbol(),
            raw: self.reader.slice_between(start, end).to_string(),
            path,
            args,
            suffix,
            escape,
        };
        tracing::trace!(raw = %token.raw, start = token.code_points.start, "scanned token");
        token
    }

    fn symbols_from(&self, start: Bookmark) -> Span {
        start.symbol()..self.reader.symbol_index()
    }
}

impl Iterator for TokenScanner<'_> {
    type Item = Result<Token, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.scan_token() {
            Ok(token) => token.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Scan every token in `source`, left to right
pub fn scan_all(source: &str, prefix: char) -> Result<Vec<Token>, SyntaxError> {
    TokenScanner::new(source, prefix).collect()
}
