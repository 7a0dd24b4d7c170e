//! In-memory map sources.

use indexmap::IndexMap;

use crate::value::{cast_str, Value};

/// Extract a settings URI from a map source, if the autoload key is
/// present and holds a string-like value.
pub(crate) fn settings_uri(entries: &IndexMap<String, Value>, key: &str) -> Option<String> {
    if key.is_empty() {
        return None;
    }
    entries.get(key).and_then(|value| cast_str(value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_uri_present() {
        let mut entries = IndexMap::new();
        entries.insert(
            "settings_uri".to_string(),
            Value::String("conf/app.yaml".to_string()),
        );
        assert_eq!(
            settings_uri(&entries, "settings_uri").as_deref(),
            Some("conf/app.yaml")
        );
    }

    #[test]
    fn test_settings_uri_absent() {
        let entries = IndexMap::new();
        assert_eq!(settings_uri(&entries, "settings_uri"), None);
    }

    #[test]
    fn test_empty_key_disables_autoload() {
        let mut entries = IndexMap::new();
        entries.insert("".to_string(), Value::String("x".to_string()));
        assert_eq!(settings_uri(&entries, ""), None);
    }

    #[test]
    fn test_non_string_uri_is_ignored() {
        let mut entries = IndexMap::new();
        entries.insert("settings_uri".to_string(), Value::Array(vec![]));
        assert_eq!(settings_uri(&entries, "settings_uri"), None);
    }
}
