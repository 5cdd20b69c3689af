//! sheetsub - placeholder substitution for stylesheets
//!
//! Rewrites placeholder tokens such as `$color.primary` or
//! `$space(2, "rem")` in otherwise opaque text, using values drawn from an
//! ordered list of value sources.
//!
//! # Example
//!
//! ```rust
//! use sheetsub::{Options, Processor, ValueSource};
//!
//! let source = ValueSource::new()
//!     .with("green", "forestgreen")
//!     .with("blood_red", vec![115, 16, 16]);
//!
//! let mut processor = Processor::new(Options::default());
//! let css = processor
//!     .substitute_blocking(&[source], "color: $green; background: rgb($blood_red);")
//!     .unwrap();
//!
//! assert_eq!(css, "color: forestgreen; background: rgb(115, 16, 16);");
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod lexer;
pub mod preprocess;
pub mod processor;
pub mod reader;
pub mod resolver;
pub mod sources;
pub mod value;

pub use config::{ErrorPolicy, Options};
pub use diagnostics::{Diagnostic, DiagnosticSink, MemorySink, NullSink, StdioSink, StreamSink};
pub use error::{SubstituteError, SyntaxError};
pub use lexer::{scan_all, Token, TokenScanner, DEFAULT_PREFIX};
pub use preprocess::{Processed, StyleBlock, StylePreprocessor};
pub use processor::{substitute, substitute_report, Processor, Report};
pub use resolver::{resolve, ResolveError};
pub use sources::{lookup, lookup_entry, SourceError, ValueSource};
pub use value::{Callable, Mapping, Value};
