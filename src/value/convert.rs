//! Conversions from YAML and TOML documents into canonical values.

use super::Value;

/// Convert a parsed YAML value into the canonical representation.
pub(crate) fn from_yaml(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                // Non-finite floats have no JSON representation.
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(seq) => {
            Value::Array(seq.into_iter().map(from_yaml).collect())
        }
        serde_yaml::Value::Mapping(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (yaml_key(&k), from_yaml(v)))
                .collect(),
        ),
        serde_yaml::Value::Tagged(tagged) => from_yaml(tagged.value),
    }
}

/// Render a YAML mapping key as a string key.
///
/// YAML allows non-string keys; JSON objects do not, so numeric and
/// boolean keys are rendered to their display form.
fn yaml_key(key: &serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Convert a parsed TOML value into the canonical representation.
pub(crate) fn from_toml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(from_toml).collect()),
        toml::Value::Table(table) => Value::Object(
            table.into_iter().map(|(k, v)| (k, from_toml(v))).collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_scalars() {
        let doc: serde_yaml::Value = serde_yaml::from_str("key: 1.5").unwrap();
        let value = from_yaml(doc);
        assert_eq!(value["key"], Value::from(1.5));
    }

    #[test]
    fn test_yaml_numeric_keys_become_strings() {
        let doc: serde_yaml::Value = serde_yaml::from_str("1: a\n2: b").unwrap();
        let value = from_yaml(doc);
        assert_eq!(value["1"], Value::String("a".to_string()));
        assert_eq!(value["2"], Value::String("b".to_string()));
    }

    #[test]
    fn test_yaml_nested_sequence() {
        let doc: serde_yaml::Value = serde_yaml::from_str("items: [1, two, 3.0]").unwrap();
        let value = from_yaml(doc);
        assert_eq!(value["items"][0], Value::from(1));
        assert_eq!(value["items"][1], Value::String("two".to_string()));
        assert_eq!(value["items"][2], Value::from(3.0));
    }

    #[test]
    fn test_toml_table() {
        let doc: toml::Value = toml::from_str("port = 8080\nname = \"app\"").unwrap();
        let value = from_toml(doc);
        assert_eq!(value["port"], Value::from(8080));
        assert_eq!(value["name"], Value::String("app".to_string()));
    }

    #[test]
    fn test_toml_datetime_renders_as_string() {
        let doc: toml::Value = toml::from_str("when = 2020-01-01T00:00:00Z").unwrap();
        let value = from_toml(doc);
        assert!(value["when"].is_string());
    }
}
