//! Turns looked-up values into replacement text

use thiserror::Error;

use crate::value::{Mapping, Value};

/// Terminator placed after flattened properties when the token had no suffix
pub const DEFAULT_PROPERTY_TERMINATOR: &str = ";\n";

/// Errors that can occur while resolving a single token
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolveError {
    /// A function returned nothing
    #[error("function returned no value")]
    UndefinedFunctionResult,

    /// A function returned another function
    #[error("to avoid infinite recursion, a function can't return a function")]
    DisallowedFunctionReturningFunction,

    /// A mapping property can't be written as a CSS value
    #[error("the CSS property '{property}' does not have a valid type ({kind})")]
    InvalidPropertyValueType { property: String, kind: &'static str },

    /// A sequence holds something that can't be joined
    #[error("a sequence can't contain a {kind}")]
    InvalidSequenceElement { kind: &'static str },
}

/// Resolve `value` into replacement text.
///
/// Functions are invoked with `args` and awaited; their result is resolved
/// in turn but may not be another function, so resolution never nests more
/// than one call deep. `suffix` is appended to scalar and sequence results;
/// mappings end with it instead of the default terminator; null drops it.
pub async fn resolve(
    value: &Value,
    args: &[String],
    suffix: Option<char>,
) -> Result<String, ResolveError> {
    match value {
        Value::Callable(f) => {
            let result = f
                .call(args)
                .await
                .ok_or(ResolveError::UndefinedFunctionResult)?;
            resolve_terminal(&result, suffix)
        }
        other => resolve_terminal(other, suffix),
    }
}

fn resolve_terminal(value: &Value, suffix: Option<char>) -> Result<String, ResolveError> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Callable(_) => Err(ResolveError::DisallowedFunctionReturningFunction),
        Value::Mapping(map) => mapping_to_properties(map, suffix),
        scalar => {
            let mut text = stringify(scalar)?;
            text.extend(suffix);
            Ok(text)
        }
    }
}

/// Render a scalar or sequence
fn stringify(value: &Value) -> Result<String, ResolveError> {
    Ok(match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Integer(n) => n.to_string(),
        Value::BigInt(n) => n.to_string(),
        Value::Float(n) => format_float(*n),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => items
            .iter()
            .map(stringify)
            .collect::<Result<Vec<_>, _>>()?
            .join(", "),
        Value::Mapping(_) | Value::Callable(_) => {
            return Err(ResolveError::InvalidSequenceElement { kind: value.kind() })
        }
    })
}

/// Plain decimals between 1e-6 and 1e21, exponent form outside
fn format_float(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if (1e-6..1e21).contains(&n.abs()) {
        return n.to_string();
    }

    let formatted = format!("{:e}", n);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => formatted,
    }
}

fn mapping_to_properties(map: &Mapping, suffix: Option<char>) -> Result<String, ResolveError> {
    let mut lines = Vec::with_capacity(map.len());

    for (property, value) in map {
        let text = match value {
            Value::Null | Value::Mapping(_) | Value::Callable(_) => {
                return Err(ResolveError::InvalidPropertyValueType {
                    property: property.clone(),
                    kind: value.kind(),
                })
            }
            _ => stringify(value)?,
        };
        lines.push(format!("{}: {}", property, text));
    }

    let mut text = lines.join(";\n");
    match suffix {
        Some(c) => text.push(c),
        None => text.push_str(DEFAULT_PROPERTY_TERMINATOR),
    }
    Ok(text)
}
