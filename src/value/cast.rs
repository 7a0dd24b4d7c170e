//! Type-coercion helpers for setting values.
//!
//! Settings frequently arrive as strings (environment variables, CSV
//! lists, serialized blobs), so each cast accepts the well-formed string
//! rendering of its target type in addition to the native kind.

use url::Url;

use super::{from_yaml, kind, Value};
use crate::error::CastError;

/// Coerce a value to a string.
///
/// Numbers and booleans render to their display form.
///
/// # Errors
///
/// Returns [`CastError::WrongKind`] for null, arrays, and objects.
pub fn cast_str(value: &Value) -> Result<String, CastError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(CastError::WrongKind {
            expected: "string",
            found: kind(other),
        }),
    }
}

/// Coerce a value to an integer.
///
/// Float values truncate toward zero; strings must parse as a base-10
/// integer.
///
/// # Errors
///
/// Returns a [`CastError`] when the value is neither a number nor a
/// well-formed integer string.
pub fn cast_int(value: &Value) -> Result<i64, CastError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| CastError::unparseable(n.to_string(), "integer")),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| CastError::unparseable(s.clone(), "integer")),
        other => Err(CastError::WrongKind {
            expected: "integer",
            found: kind(other),
        }),
    }
}

/// Coerce a value to a float.
///
/// # Errors
///
/// Returns a [`CastError`] when the value is neither a number nor a
/// well-formed float string.
pub fn cast_float(value: &Value) -> Result<f64, CastError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| CastError::unparseable(n.to_string(), "float")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| CastError::unparseable(s.clone(), "float")),
        other => Err(CastError::WrongKind {
            expected: "float",
            found: kind(other),
        }),
    }
}

/// Coerce a value to a boolean by recognizing common truthy and falsy
/// spellings.
///
/// Strings `true`/`t`/`1` are true and `false`/`f`/`0`/`none`/`null`/``
/// are false, case-insensitively. Numbers are true when nonzero; null is
/// false.
///
/// # Errors
///
/// Returns a [`CastError`] for unrecognized strings, arrays, and objects.
pub fn cast_bool(value: &Value) -> Result<bool, CastError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Null => Ok(false),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "t" | "1" => Ok(true),
            "false" | "f" | "0" | "none" | "null" | "" => Ok(false),
            _ => Err(CastError::unparseable(s.clone(), "bool")),
        },
        other => Err(CastError::WrongKind {
            expected: "bool",
            found: kind(other),
        }),
    }
}

/// Coerce a value to a list.
///
/// Arrays pass through. A string that looks like a serialized array
/// (`[...]`) parses as JSON-then-YAML; any other string splits on
/// `delimiter` with surrounding whitespace trimmed from each element.
///
/// # Errors
///
/// Returns a [`CastError`] when the value is neither an array nor a
/// string.
pub fn cast_list(value: &Value, delimiter: char) -> Result<Vec<Value>, CastError> {
    match value {
        Value::Array(items) => Ok(items.clone()),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                match cast_serialized(value)? {
                    Value::Array(items) => Ok(items),
                    other => Err(CastError::WrongKind {
                        expected: "array",
                        found: kind(&other),
                    }),
                }
            } else {
                Ok(trimmed
                    .split(delimiter)
                    .map(|part| Value::String(part.trim().to_string()))
                    .collect())
            }
        }
        other => Err(CastError::WrongKind {
            expected: "list",
            found: kind(other),
        }),
    }
}

/// Coerce a value to a deserialized object or array.
///
/// Objects, arrays, and null pass through. Strings are parsed as JSON
/// first, then YAML.
///
/// # Errors
///
/// Returns a [`CastError`] when a string parses as neither format, or
/// when the value is a bare number or boolean.
pub fn cast_serialized(value: &Value) -> Result<Value, CastError> {
    match value {
        Value::Object(_) | Value::Array(_) | Value::Null => Ok(value.clone()),
        Value::String(s) => {
            if let Ok(parsed) = serde_json::from_str::<Value>(s) {
                return Ok(parsed);
            }
            serde_yaml::from_str::<serde_yaml::Value>(s)
                .map(from_yaml)
                .map_err(|_| CastError::unparseable(s.clone(), "JSON or YAML"))
        }
        other => Err(CastError::WrongKind {
            expected: "object or array",
            found: kind(other),
        }),
    }
}

/// Coerce a value to a parsed URL.
///
/// # Errors
///
/// Returns a [`CastError`] when the value is not a string or does not
/// parse as an absolute URL.
pub fn cast_uri(value: &Value) -> Result<Url, CastError> {
    let raw = cast_str(value)?;
    Url::parse(&raw).map_err(|_| CastError::unparseable(raw, "URL"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_str_from_number() {
        assert_eq!(cast_str(&Value::from(42)).unwrap(), "42");
    }

    #[test]
    fn test_cast_str_rejects_array() {
        let err = cast_str(&Value::Array(vec![])).unwrap_err();
        assert!(matches!(err, CastError::WrongKind { .. }));
    }

    #[test]
    fn test_cast_int_from_string() {
        assert_eq!(cast_int(&Value::String(" 17 ".to_string())).unwrap(), 17);
    }

    #[test]
    fn test_cast_int_truncates_float() {
        assert_eq!(cast_int(&Value::from(1.9)).unwrap(), 1);
    }

    #[test]
    fn test_cast_int_rejects_float_string() {
        assert!(cast_int(&Value::String("1.5".to_string())).is_err());
    }

    #[test]
    fn test_cast_float_round_trips_string() {
        assert!((cast_float(&Value::String("1.5".to_string())).unwrap() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cast_bool_truthy_spellings() {
        for raw in ["true", "True", "T", "1", " t "] {
            assert!(cast_bool(&Value::String(raw.to_string())).unwrap(), "{raw}");
        }
    }

    #[test]
    fn test_cast_bool_falsy_spellings() {
        for raw in ["false", "F", "0", "None", "null", ""] {
            assert!(!cast_bool(&Value::String(raw.to_string())).unwrap(), "{raw}");
        }
    }

    #[test]
    fn test_cast_bool_rejects_unknown_string() {
        assert!(cast_bool(&Value::String("maybe".to_string())).is_err());
    }

    #[test]
    fn test_cast_bool_null_is_false() {
        assert!(!cast_bool(&Value::Null).unwrap());
    }

    #[test]
    fn test_cast_list_splits_csv() {
        let items = cast_list(&Value::String("apples, oranges, pears".to_string()), ',').unwrap();
        assert_eq!(
            items,
            vec![
                Value::String("apples".to_string()),
                Value::String("oranges".to_string()),
                Value::String("pears".to_string()),
            ]
        );
    }

    #[test]
    fn test_cast_list_parses_serialized_array() {
        let items = cast_list(&Value::String("[1, 2, 3]".to_string()), ',').unwrap();
        assert_eq!(items, vec![Value::from(1), Value::from(2), Value::from(3)]);
    }

    #[test]
    fn test_cast_list_passes_arrays_through() {
        let array = Value::Array(vec![Value::from(1), Value::String("a".to_string())]);
        assert_eq!(cast_list(&array, ',').unwrap().len(), 2);
    }

    #[test]
    fn test_cast_serialized_json_first() {
        let value = Value::String(r#"{"a": 1, "b": 2}"#.to_string());
        let parsed = cast_serialized(&value).unwrap();
        assert_eq!(parsed["a"], Value::from(1));
    }

    #[test]
    fn test_cast_serialized_yaml_fallback() {
        let value = Value::String("a: 1\nb: 2".to_string());
        let parsed = cast_serialized(&value).unwrap();
        assert_eq!(parsed["b"], Value::from(2));
    }

    #[test]
    fn test_cast_serialized_rejects_number() {
        assert!(cast_serialized(&Value::from(3)).is_err());
    }

    #[test]
    fn test_cast_uri() {
        let url = cast_uri(&Value::String("https://example.com/settings.yaml".to_string())).unwrap();
        assert_eq!(url.scheme(), "https");
    }

    #[test]
    fn test_cast_uri_rejects_relative() {
        assert!(cast_uri(&Value::String("not a url".to_string())).is_err());
    }
}
