//! Error types for scanning and substitution

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::reader::ReaderError;
use crate::resolver::ResolveError;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Malformed placeholder syntax.
///
/// `symbols` is the symbol (char) range of the offending token and
/// `position` its code-point offset. A syntax error invalidates every offset
/// after it, so it always ends the substitution call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("empty token name after '{prefix}' at {position}")]
    EmptyTokenName {
        prefix: char,
        symbols: Span,
        position: usize,
    },

    #[error("empty path segment in '{name}' at {position}")]
    EmptyPathSegment {
        name: String,
        symbols: Span,
        position: usize,
    },

    #[error("missing argument for '{name}' at {position}")]
    MissingArgument {
        name: String,
        symbols: Span,
        position: usize,
    },

    #[error("unterminated string for argument of '{name}' at {position}")]
    UnterminatedQuotedArgument {
        name: String,
        symbols: Span,
        position: usize,
    },

    #[error("unterminated argument list for '{name}': {source}")]
    UnterminatedArgumentList {
        name: String,
        symbols: Span,
        position: usize,
        source: ReaderError,
    },

    #[error(transparent)]
    Reader(#[from] ReaderError),
}

impl SyntaxError {
    /// Symbol range of the offending token, if known
    pub fn symbols(&self) -> Option<Span> {
        match self {
            SyntaxError::EmptyTokenName { symbols, .. }
            | SyntaxError::EmptyPathSegment { symbols, .. }
            | SyntaxError::MissingArgument { symbols, .. }
            | SyntaxError::UnterminatedQuotedArgument { symbols, .. }
            | SyntaxError::UnterminatedArgumentList { symbols, .. } => Some(symbols.clone()),
            SyntaxError::Reader(_) => None,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let span = self.symbols().unwrap_or(0..0);
        let message = self.to_string();
        let mut buf = Vec::new();

        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(&message)
            .with_label(
                Label::new((filename, span))
                    .with_message(message.clone())
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => message,
        }
    }
}

/// Errors surfaced by a substitution call
#[derive(Error, Debug)]
pub enum SubstituteError {
    /// The text could not be scanned; no tokens were replaced
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    /// A token failed to resolve under the abort policy
    #[error("failed to resolve '{token}': {source}")]
    Resolve {
        token: String,
        #[source]
        source: ResolveError,
    },
}
