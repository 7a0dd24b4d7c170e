//! Environment source.

use indexmap::IndexMap;

use crate::value::Value;

/// Snapshot the process environment as a settings map.
pub(crate) fn snapshot() -> IndexMap<String, Value> {
    std::env::vars()
        .map(|(k, v)| (k, Value::String(v)))
        .collect()
}

/// Case-insensitive search of the environment for a single key.
pub(crate) fn find(key: &str) -> Option<String> {
    let folded = key.to_lowercase();
    std::env::vars()
        .find(|(k, _)| k.to_lowercase() == folded)
        .map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_contains_set_variable() {
        std::env::set_var("STRATA_ENV_SNAPSHOT_TEST", "present");
        let values = snapshot();
        assert_eq!(
            values.get("STRATA_ENV_SNAPSHOT_TEST"),
            Some(&Value::String("present".to_string()))
        );
        std::env::remove_var("STRATA_ENV_SNAPSHOT_TEST");
    }

    #[test]
    fn test_find_is_case_insensitive() {
        std::env::set_var("STRATA_ENV_FIND_TEST", "found");
        assert_eq!(find("strata_env_find_test").as_deref(), Some("found"));
        std::env::remove_var("STRATA_ENV_FIND_TEST");
        assert_eq!(find("strata_env_find_test"), None);
    }
}
