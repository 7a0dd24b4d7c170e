//! Setting values and type coercion.
//!
//! Every source is normalized into JSON-shaped values so that lookups
//! behave the same regardless of where a setting came from. The `cast_*`
//! helpers implement the string-friendly coercions the typed getters on
//! [`Settings`](crate::Settings) expose.

mod cast;
mod convert;
mod workers;

pub use cast::{cast_bool, cast_float, cast_int, cast_list, cast_serialized, cast_str, cast_uri};
pub use workers::{cpu_count, parse_workers};

/// Canonical setting value.
pub use serde_json::Value;

pub(crate) use convert::{from_toml, from_yaml};

/// Human-readable kind name for a value, used in cast errors.
pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
