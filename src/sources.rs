//! Value sources and path lookup
//!
//! A value source is a tree of [`Value`]s. Callers pass an ordered list of
//! sources; lookups search them in order and the first source defining a
//! path wins.

use std::path::Path;

use thiserror::Error;

use crate::value::{Mapping, Value};

/// Errors that can occur when loading a value source
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read value source file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse value source TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// One tree of values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueSource {
    /// Optional label, shown in trace and warning events
    pub name: Option<String>,
    values: Mapping,
}

impl ValueSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty source with a label
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            values: Mapping::new(),
        }
    }

    /// Add a top level value, builder style
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add or replace a top level value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// The name, or `"unnamed"`
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn values(&self) -> &Mapping {
        &self.values
    }

    /// Load a source from a TOML file, labelled with the file stem
    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path)?;
        let mut source = Self::from_toml_str(&content)?;
        source.name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());
        Ok(source)
    }

    /// Load a source from a TOML string; the root table becomes the tree
    pub fn from_toml_str(content: &str) -> Result<Self, SourceError> {
        let table: toml::Table = toml::from_str(content)?;
        Ok(Self {
            name: None,
            values: table
                .into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect(),
        })
    }

    /// Walk `path` through this source.
    ///
    /// A missing or null value before the last segment yields `None`; a null
    /// at the last segment is returned as found.
    pub fn find(&self, path: &[String]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut value = self.values.get(first)?;

        for segment in rest {
            if value.is_null() {
                return None;
            }
            value = value.child(segment)?;
        }

        Some(value)
    }
}

impl From<Mapping> for ValueSource {
    fn from(values: Mapping) -> Self {
        Self { name: None, values }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ValueSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            name: None,
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Find `path` in the first source that defines it
pub fn lookup<'v>(sources: &'v [ValueSource], path: &[String]) -> Option<&'v Value> {
    lookup_entry(sources, path).map(|(_, value)| value)
}

/// Like [`lookup`], also returning the source the value came from
pub fn lookup_entry<'v>(
    sources: &'v [ValueSource],
    path: &[String],
) -> Option<(&'v ValueSource, &'v Value)> {
    sources
        .iter()
        .find_map(|source| source.find(path).map(|value| (source, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(p: &str) -> Vec<String> {
        p.split('.').map(str::to_string).collect()
    }

    #[test]
    fn test_lookup_single_source() {
        let sources = [ValueSource::new().with("green", "forestgreen")];
        assert_eq!(
            lookup(&sources, &path("green")),
            Some(&Value::from("forestgreen"))
        );
        assert_eq!(lookup(&sources, &path("red")), None);
    }

    #[test]
    fn test_lookup_nested() {
        let color: Value = [("blood_red", "rgb(115, 16, 16)")].into_iter().collect();
        let sources = [ValueSource::new().with("color", color)];
        assert_eq!(
            lookup(&sources, &path("color.blood_red")),
            Some(&Value::from("rgb(115, 16, 16)"))
        );
        assert_eq!(lookup(&sources, &path("color.blood_red.deeper")), None);
        assert_eq!(lookup(&sources, &path("color.missing")), None);
    }

    #[test]
    fn test_lookup_first_match_wins() {
        let sources = [
            ValueSource::new().with("a", "alpha"),
            ValueSource::new().with("b", "beta").with("a", "shadowed"),
            ValueSource::new().with("c", "charlie"),
        ];
        assert_eq!(lookup(&sources, &path("c")), Some(&Value::from("charlie")));
        assert_eq!(lookup(&sources, &path("a")), Some(&Value::from("alpha")));
    }

    #[test]
    fn test_lookup_entry_names_winning_source() {
        let sources = [
            ValueSource::named("base").with("a", "alpha"),
            ValueSource::named("theme").with("b", "beta"),
            ValueSource::new().with("c", "charlie"),
        ];

        let (source, value) = lookup_entry(&sources, &path("b")).expect("Should find b");
        assert_eq!(source.label(), "theme");
        assert_eq!(value, &Value::from("beta"));

        let (source, _) = lookup_entry(&sources, &path("c")).expect("Should find c");
        assert_eq!(source.label(), "unnamed");
        assert!(lookup_entry(&sources, &path("d")).is_none());
    }

    #[test]
    fn test_null_leaf_is_found() {
        let sources = [ValueSource::new().with("green", Value::Null)];
        assert_eq!(lookup(&sources, &path("green")), Some(&Value::Null));
    }

    #[test]
    fn test_null_midway_falls_through_to_later_source() {
        let theme: Value = [("primary", "ice_cream")].into_iter().collect();
        let sources = [
            ValueSource::new().with("theme", Value::Null),
            ValueSource::new().with("theme", theme),
        ];
        assert_eq!(
            lookup(&sources, &path("theme.primary")),
            Some(&Value::from("ice_cream"))
        );
    }

    #[test]
    fn test_sequence_index_segment() {
        let sources = [ValueSource::new().with("rgb", vec![115, 16, 16])];
        assert_eq!(lookup(&sources, &path("rgb.1")), Some(&Value::Integer(16)));
    }

    #[test]
    fn test_empty_sources() {
        assert_eq!(lookup(&[], &path("a")), None);
        assert_eq!(lookup(&[ValueSource::new()], &[]), None);
    }

    #[test]
    fn test_from_toml_str() {
        let source = ValueSource::from_toml_str(
            r#"
space = { md = "1rem", lg = "2rem" }
font-family = ["sans-serif", "Arial"]
"#,
        )
        .expect("Should parse");

        assert_eq!(source.find(&path("space.lg")), Some(&Value::from("2rem")));
        assert!(matches!(source.get("font-family"), Some(Value::Sequence(items)) if items.len() == 2));
    }

    #[test]
    fn test_invalid_toml_error() {
        let result = ValueSource::from_toml_str("this is not valid toml {{{{");
        assert!(matches!(result, Err(SourceError::ParseError(_))));
    }

    #[test]
    fn test_from_file_names_source_after_stem() {
        let stem = format!("sheetsub-palette-{}", std::process::id());
        let path = std::env::temp_dir().join(format!("{}.toml", stem));
        std::fs::write(&path, "green = \"forestgreen\"\n").expect("Should write temp file");

        let source = ValueSource::from_file(&path);
        std::fs::remove_file(&path).ok();

        let source = source.expect("Should load");
        assert_eq!(source.label(), stem);
        assert_eq!(source.get("green"), Some(&Value::from("forestgreen")));
    }

    #[test]
    fn test_missing_file_error() {
        let result = ValueSource::from_file(Path::new("/nonexistent/values.toml"));
        assert!(matches!(result, Err(SourceError::IoError(_))));
    }
}
