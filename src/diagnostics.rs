//! Per-token failure reports
//!
//! When a token fails to resolve under [`ErrorPolicy::Report`], the
//! processor builds a [`Diagnostic`] and hands it to a [`DiagnosticSink`].
//! Where the record goes is up to the caller; [`StreamSink::stdio`] is only
//! the default at the top level.
//!
//! [`ErrorPolicy::Report`]: crate::config::ErrorPolicy::Report

use std::fmt;
use std::io::{self, Write};

use crate::lexer::Token;

/// Context for a token that failed to resolve
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Label of the text being processed, usually a file name
    pub filename: String,
    /// Exact token text
    pub token_raw: String,
    /// Dotted token path
    pub token_path: String,
    /// Code-point offset of the token
    pub position: usize,
    /// Error message
    pub message: String,
}

impl Diagnostic {
    pub fn new(filename: &str, token: &Token, message: impl Into<String>) -> Self {
        Self {
            filename: filename.to_string(),
            token_raw: token.raw.clone(),
            token_path: token.name(),
            position: token.code_points.start,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: '{}': {}",
            self.filename, self.position, self.token_raw, self.message
        )
    }
}

/// Receives diagnostics
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: &Diagnostic);
}

impl<F: FnMut(&Diagnostic)> DiagnosticSink for F {
    fn report(&mut self, diagnostic: &Diagnostic) {
        self(diagnostic)
    }
}

/// Writes the error to one stream and the token context to another
#[derive(Debug)]
pub struct StreamSink<I, E> {
    info: I,
    error: E,
}

/// The default sink: token context on stdout, errors on stderr
pub type StdioSink = StreamSink<io::Stdout, io::Stderr>;

impl<I: Write, E: Write> StreamSink<I, E> {
    pub fn new(info: I, error: E) -> Self {
        Self { info, error }
    }

    pub fn into_inner(self) -> (I, E) {
        (self.info, self.error)
    }
}

impl StreamSink<io::Stdout, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl Default for StdioSink {
    fn default() -> Self {
        Self::stdio()
    }
}

impl<I: Write, E: Write> DiagnosticSink for StreamSink<I, E> {
    fn report(&mut self, diagnostic: &Diagnostic) {
        // A broken diagnostics stream must not fail the substitution.
        let _ = writeln!(self.error, "sheetsub error: {}", diagnostic.filename);
        let _ = writeln!(self.error, "{}", diagnostic.message);
        let _ = writeln!(
            self.info,
            "sheetsub token: '{}' (path {}, position {})",
            diagnostic.token_raw, diagnostic.token_path, diagnostic.position
        );
    }
}

/// Keeps every diagnostic in memory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySink {
    pub diagnostics: Vec<Diagnostic>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&mut self, diagnostic: &Diagnostic) {
        self.diagnostics.push(diagnostic.clone());
    }
}

/// Drops every diagnostic
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&mut self, _diagnostic: &Diagnostic) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::scan_all;

    fn diagnostic() -> Diagnostic {
        let token = scan_all("a { color: $theme.text; }", '$')
            .unwrap()
            .remove(0);
        Diagnostic::new("App.svelte", &token, "function returned no value")
    }

    #[test]
    fn test_diagnostic_from_token() {
        let d = diagnostic();
        assert_eq!(d.token_raw, "$theme.text;");
        assert_eq!(d.token_path, "theme.text");
        assert_eq!(d.position, 11);
        assert_eq!(
            d.to_string(),
            "App.svelte:11: '$theme.text;': function returned no value"
        );
    }

    #[test]
    fn test_stream_sink_splits_streams() {
        let mut sink = StreamSink::new(Vec::new(), Vec::new());
        sink.report(&diagnostic());

        let (info, error) = sink.into_inner();
        let info = String::from_utf8(info).unwrap();
        let error = String::from_utf8(error).unwrap();

        assert_eq!(
            error,
            "sheetsub error: App.svelte\nfunction returned no value\n"
        );
        assert_eq!(
            info,
            "sheetsub token: '$theme.text;' (path theme.text, position 11)\n"
        );
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |d: &Diagnostic| seen.push(d.token_path.clone());
            sink.report(&diagnostic());
        }
        assert_eq!(seen, vec!["theme.text"]);
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new();
        sink.report(&diagnostic());
        NullSink.report(&diagnostic());
        assert_eq!(sink.diagnostics, vec![diagnostic()]);
    }
}
