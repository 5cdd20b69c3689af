//! Values held by value sources
//!
//! A looked-up value is classified once, by its variant, and the resolver
//! matches on it exhaustively. "Absent" is not a variant: lookups return
//! `Option<&Value>` and `None` means no source defines the path.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{self, BoxFuture, FutureExt};
use indexmap::IndexMap;

/// Ordered key/value tree level
pub type Mapping = IndexMap<String, Value>;

type CallableFn = dyn Fn(Vec<String>) -> BoxFuture<'static, Option<Value>> + Send + Sync;

/// A user supplied function invoked with a token's raw arguments.
///
/// Synchronous and asynchronous functions are stored the same way and are
/// always awaited. A `None` result means the function produced no value.
#[derive(Clone)]
pub struct Callable(Arc<CallableFn>);

impl Callable {
    /// Wrap a synchronous function
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[String]) -> Option<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(move |args: Vec<String>| future::ready(f(&args)).boxed()))
    }

    /// Wrap a function returning a future
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<Value>> + Send + 'static,
    {
        Self(Arc::new(move |args: Vec<String>| f(args).boxed()))
    }

    /// Invoke with the given arguments
    pub fn call(&self, args: &[String]) -> BoxFuture<'static, Option<Value>> {
        (self.0)(args.to_vec())
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callable(..)")
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A node in a value source tree
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicitly empty; resolves to an empty string
    Null,
    Bool(bool),
    Integer(i64),
    BigInt(i128),
    Float(f64),
    String(String),
    /// Joined with `", "` when resolved
    Sequence(Vec<Value>),
    /// Flattened into `key: value` properties when resolved
    Mapping(Mapping),
    Callable(Callable),
}

impl Value {
    /// Build a callable value from a synchronous function
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&[String]) -> Option<Value> + Send + Sync + 'static,
    {
        Value::Callable(Callable::new(f))
    }

    /// Build a callable value from an asynchronous function
    pub fn async_function<F, Fut>(f: F) -> Self
    where
        F: Fn(Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<Value>> + Send + 'static,
    {
        Value::Callable(Callable::from_async(f))
    }

    /// Short name of the variant, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) | Value::Float(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
            Value::Callable(_) => "function",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Child value for one path segment.
    ///
    /// Mappings are indexed by key and sequences by decimal position;
    /// everything else has no children.
    pub fn child(&self, segment: &str) -> Option<&Value> {
        match self {
            Value::Mapping(map) => map.get(segment),
            Value::Sequence(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i128> for Value {
    fn from(n: i128) -> Self {
        Value::BigInt(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<Callable> for Value {
    fn from(f: Callable) -> Self {
        Value::Callable(f)
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Self {
        Value::Mapping(map)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Mapping(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<toml::Value> for Value {
    fn from(v: toml::Value) -> Self {
        match v {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(n) => Value::Integer(n),
            toml::Value::Float(n) => Value::Float(n),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(items) => Value::Sequence(items.into_iter().map(Value::from).collect()),
            toml::Value::Table(table) => table.into_iter().collect(),
        }
    }
}
