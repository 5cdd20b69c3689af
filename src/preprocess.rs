//! Style block preprocessing for build tool integrations
//!
//! A bundler hands over each `<style>` block's content, its `lang`
//! attribute and the file it came from, and expects the processed code
//! back. Blocks in other languages are declined.

use crate::config::Options;
use crate::diagnostics::{DiagnosticSink, StdioSink};
use crate::error::SubstituteError;
use crate::processor::Processor;
use crate::sources::ValueSource;

/// `lang` values handled by default; the empty string is a missing `lang`
pub const DEFAULT_LANGS: &[&str] = &["", "text/css", "text/sheetsub"];

/// A style block as supplied by the build tool
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleBlock<'a> {
    pub content: &'a str,
    pub lang: Option<&'a str>,
    pub filename: Option<&'a str>,
}

/// Processed style block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed {
    pub code: String,
}

/// Holds the sources and options shared by every style block of a build
#[derive(Debug, Clone)]
pub struct StylePreprocessor {
    sources: Vec<ValueSource>,
    options: Options,
    langs: Vec<String>,
}

impl StylePreprocessor {
    pub fn new(sources: Vec<ValueSource>) -> Self {
        Self {
            sources,
            options: Options::default(),
            langs: DEFAULT_LANGS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Set the options used for every block
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Replace the accepted `lang` values
    pub fn with_langs<I, L>(mut self, langs: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        self.langs = langs.into_iter().map(Into::into).collect();
        self
    }

    pub fn accepts(&self, lang: Option<&str>) -> bool {
        let lang = lang.unwrap_or("");
        self.langs.iter().any(|l| l == lang)
    }

    /// Process a block, reporting to stdout and stderr
    pub async fn style(&self, block: StyleBlock<'_>) -> Result<Option<Processed>, SubstituteError> {
        self.style_with_sink(block, StdioSink::stdio()).await
    }

    /// Process a block with a custom diagnostic sink.
    ///
    /// Returns `None` when the block's `lang` is not accepted.
    pub async fn style_with_sink<S: DiagnosticSink>(
        &self,
        block: StyleBlock<'_>,
        sink: S,
    ) -> Result<Option<Processed>, SubstituteError> {
        if !self.accepts(block.lang) {
            tracing::trace!(lang = ?block.lang, "skipping style block");
            return Ok(None);
        }

        let options = self
            .options
            .clone()
            .with_filename(block.filename.unwrap_or_default());
        let mut processor = Processor::with_sink(options, sink);
        let code = processor.substitute(&self.sources, block.content).await?;

        Ok(Some(Processed { code }))
    }
}
