//! Substitution of every token in a text
//!
//! All tokens are scanned before anything is replaced. Token offsets refer
//! to the original text, so replacements are spliced in from the last token
//! to the first: a splice only shifts text at or after the token it
//! replaces, leaving the offsets of every token still to be processed valid.

use unicode_normalization::UnicodeNormalization;

use crate::config::{ErrorPolicy, Options};
use crate::diagnostics::{Diagnostic, DiagnosticSink, MemorySink, StdioSink};
use crate::error::SubstituteError;
use crate::lexer::{scan_all, Token};
use crate::resolver::{resolve, ResolveError};
use crate::sources::{lookup_entry, ValueSource};

/// Result of [`substitute_report`]
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// The substituted text
    pub text: String,
    /// One record per token that failed to resolve
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs substitutions with a fixed set of options and a diagnostic sink
#[derive(Debug)]
pub struct Processor<S = StdioSink> {
    options: Options,
    sink: S,
}

impl Processor<StdioSink> {
    /// Processor reporting to stdout and stderr
    pub fn new(options: Options) -> Self {
        Self::with_sink(options, StdioSink::stdio())
    }
}

impl Default for Processor<StdioSink> {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl<S: DiagnosticSink> Processor<S> {
    pub fn with_sink(options: Options, sink: S) -> Self {
        Self { options, sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Replace every token in `text` with its value from `sources`.
    ///
    /// Tokens whose path no source defines are left as they are. Syntax
    /// errors always fail the call; resolution failures follow
    /// [`Options::on_error`].
    pub async fn substitute(
        &mut self,
        sources: &[ValueSource],
        text: &str,
    ) -> Result<String, SubstituteError> {
        self.pass(sources, text, true).await
    }

    /// [`substitute`](Self::substitute) driven to completion on this thread
    pub fn substitute_blocking(
        &mut self,
        sources: &[ValueSource],
        text: &str,
    ) -> Result<String, SubstituteError> {
        pollster::block_on(self.substitute(sources, text))
    }

    /// One full pass per source, in order.
    ///
    /// Unlike [`substitute`](Self::substitute), a placeholder produced by one
    /// source can be resolved by a later one. Escapes are only collapsed by
    /// the last pass, so `$$b` still comes out as the literal `$b`.
    pub async fn substitute_each(
        &mut self,
        sources: &[ValueSource],
        text: &str,
    ) -> Result<String, SubstituteError> {
        let Some((last, rest)) = sources.split_last() else {
            return self.substitute(&[], text).await;
        };

        let mut text = text.to_string();
        for source in rest {
            text = self.pass(std::slice::from_ref(source), &text, false).await?;
        }
        self.pass(std::slice::from_ref(last), &text, true).await
    }

    async fn pass(
        &mut self,
        sources: &[ValueSource],
        text: &str,
        collapse_escapes: bool,
    ) -> Result<String, SubstituteError> {
        let mut text: String = text.nfc().collect();
        let tokens = scan_all(&text, self.options.prefix)?;

        tracing::debug!(
            filename = %self.options.filename,
            tokens = tokens.len(),
            sources = sources.len(),
            "substituting"
        );

        for token in tokens.iter().rev() {
            if token.escape && !collapse_escapes {
                continue;
            }
            match self.replacement(sources, token).await {
                Ok(Some(replacement)) => text.replace_range(token.span.clone(), &replacement),
                Ok(None) => tracing::trace!(token = %token.raw, "no value, left in place"),
                Err(e) => self.handle_error(token, e)?,
            }
        }

        Ok(text)
    }

    async fn replacement(
        &self,
        sources: &[ValueSource],
        token: &Token,
    ) -> Result<Option<String>, ResolveError> {
        if token.escape {
            let mut literal = self.options.prefix.to_string();
            literal.extend(token.suffix);
            return Ok(Some(literal));
        }

        let Some((source, value)) = lookup_entry(sources, &token.path) else {
            return Ok(None);
        };
        tracing::trace!(token = %token.raw, source = source.label(), "found value");

        resolve(value, &token.args, token.suffix).await.map(Some)
    }

    fn handle_error(&mut self, token: &Token, error: ResolveError) -> Result<(), SubstituteError> {
        tracing::warn!(
            filename = %self.options.filename,
            token = %token.raw,
            position = token.code_points.start,
            error = %error,
            "token failed to resolve"
        );

        if self.options.print_errors {
            let diagnostic = Diagnostic::new(&self.options.filename, token, error.to_string());
            self.sink.report(&diagnostic);
        }

        match self.options.on_error {
            ErrorPolicy::Report => Ok(()),
            ErrorPolicy::Abort => Err(SubstituteError::Resolve {
                token: token.raw.clone(),
                source: error,
            }),
        }
    }
}

/// Substitute with default options, reporting to stdout and stderr
pub async fn substitute(sources: &[ValueSource], text: &str) -> Result<String, SubstituteError> {
    Processor::default().substitute(sources, text).await
}

/// Substitute and collect diagnostics instead of printing them
pub async fn substitute_report(
    sources: &[ValueSource],
    text: &str,
    options: Options,
) -> Result<Report, SubstituteError> {
    let mut processor = Processor::with_sink(options.with_print_errors(true), MemorySink::new());
    let text = processor.substitute(sources, text).await?;
    Ok(Report {
        text,
        diagnostics: processor.into_sink().diagnostics,
    })
}
