//! Configuration for substitution

use serde::Deserialize;

use crate::lexer::DEFAULT_PREFIX;

/// What to do when a token fails to resolve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Report the failure, leave the token text in place and carry on
    #[default]
    Report,
    /// Stop at the first failure and return it
    Abort,
}

/// Configuration options for a substitution call
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Options {
    /// Rune starting a placeholder
    pub prefix: char,

    /// Failure handling for individual tokens
    pub on_error: ErrorPolicy,

    /// Label used in diagnostics, usually the file name
    pub filename: String,

    /// Whether failures are written to the diagnostic sink
    pub print_errors: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX,
            on_error: ErrorPolicy::Report,
            filename: String::new(),
            print_errors: true,
        }
    }
}

#[derive(Deserialize)]
struct TomlOptions {
    #[serde(default)]
    options: Options,
}

impl Options {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the `[options]` table of a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let parsed: TomlOptions = toml::from_str(content)?;
        Ok(parsed.options)
    }

    /// Set the placeholder prefix
    pub fn with_prefix(mut self, prefix: char) -> Self {
        self.prefix = prefix;
        self
    }

    /// Set the failure policy
    pub fn with_on_error(mut self, policy: ErrorPolicy) -> Self {
        self.on_error = policy;
        self
    }

    /// Set the diagnostic label
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Enable or disable writing failures to the sink
    pub fn with_print_errors(mut self, print: bool) -> Self {
        self.print_errors = print;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = Options::default();
        assert_eq!(options.prefix, '$');
        assert_eq!(options.on_error, ErrorPolicy::Report);
        assert!(options.filename.is_empty());
        assert!(options.print_errors);
    }

    #[test]
    fn test_builder_pattern() {
        let options = Options::new()
            .with_prefix('@')
            .with_on_error(ErrorPolicy::Abort)
            .with_filename("Test.svelte")
            .with_print_errors(false);

        assert_eq!(options.prefix, '@');
        assert_eq!(options.on_error, ErrorPolicy::Abort);
        assert_eq!(options.filename, "Test.svelte");
        assert!(!options.print_errors);
    }

    #[test]
    fn test_from_toml() {
        let options = Options::from_toml_str(
            r#"
[options]
prefix = "@"
on-error = "abort"
"#,
        )
        .expect("Should parse");

        assert_eq!(options.prefix, '@');
        assert_eq!(options.on_error, ErrorPolicy::Abort);
        assert!(options.print_errors);
    }

    #[test]
    fn test_from_toml_without_table() {
        let options = Options::from_toml_str("").expect("Should parse");
        assert_eq!(options, Options::default());
    }

    #[test]
    fn test_invalid_policy() {
        let result = Options::from_toml_str("[options]\non-error = \"explode\"\n");
        assert!(result.is_err());
    }
}
