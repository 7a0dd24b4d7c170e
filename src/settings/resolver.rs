//! Settings resolution across ordered source layers.

use url::Url;

use crate::error::{CastError, Error, Result};
use crate::source::{Layer, Source, DEFAULT_ENV_SETTINGS_URI_KEY, DEFAULT_MAP_SETTINGS_URI_KEY};
use crate::value::{
    cast_bool, cast_float, cast_int, cast_list, cast_serialized, cast_str, cast_uri,
    parse_workers, Value,
};

/// What to do when a key is absent from every source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissPolicy {
    /// Resolve to nothing quietly.
    Ignore,
    /// Resolve to nothing and log a warning.
    #[default]
    Warn,
    /// Fail the lookup with [`Error::MissingKey`].
    Raise,
}

/// Per-call overrides for a single lookup.
///
/// Fields left as `None` fall back to the resolver's configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lookup {
    /// Override the configured case sensitivity.
    pub case_sensitive: Option<bool>,
    /// Override the configured miss policy.
    pub policy: Option<MissPolicy>,
}

/// Builder for [`Settings`].
///
/// Sources are searched in the order given, after any `search_first`
/// sources (by default the environment, then the settings file named by
/// `SETTINGS_URI` when that variable is set).
#[derive(Debug)]
pub struct SettingsBuilder {
    sources: Vec<Source>,
    search_first: Vec<Source>,
    case_sensitive: bool,
    policy: MissPolicy,
    env_settings_uri_key: String,
    map_settings_uri_key: String,
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            search_first: vec![Source::Env, Source::EnvSettingsUri],
            case_sensitive: false,
            policy: MissPolicy::default(),
            env_settings_uri_key: DEFAULT_ENV_SETTINGS_URI_KEY.to_string(),
            map_settings_uri_key: DEFAULT_MAP_SETTINGS_URI_KEY.to_string(),
        }
    }
}

impl SettingsBuilder {
    /// Append a source to the search order.
    #[must_use]
    pub fn source(mut self, source: impl Into<Source>) -> Self {
        self.sources.push(source.into());
        self
    }

    /// Replace the sources searched before all others.
    #[must_use]
    pub fn search_first(mut self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.search_first = sources.into_iter().collect();
        self
    }

    /// Set whether key comparisons are case sensitive (default false).
    #[must_use]
    pub const fn case_sensitive(mut self, yes: bool) -> Self {
        self.case_sensitive = yes;
        self
    }

    /// Set the miss policy (default [`MissPolicy::Warn`]).
    #[must_use]
    pub const fn miss_policy(mut self, policy: MissPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the environment key naming a settings URI to autoload.
    #[must_use]
    pub fn env_settings_uri_key(mut self, key: impl Into<String>) -> Self {
        self.env_settings_uri_key = key.into();
        self
    }

    /// Set the map key naming a settings URI to autoload. An empty key
    /// disables autoload from map sources.
    #[must_use]
    pub fn map_settings_uri_key(mut self, key: impl Into<String>) -> Self {
        self.map_settings_uri_key = key.into();
        self
    }

    /// Load every source and assemble the resolver.
    ///
    /// Empty layers are dropped. Map layers get unique `map_N` names; a
    /// URI or environment source appearing twice keeps its first layer
    /// and logs a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if any source fails to load or parse.
    pub fn build(self) -> Result<Settings> {
        let mut layers: Vec<Layer> = Vec::new();

        for source in self.search_first.iter().chain(self.sources.iter()) {
            for mut layer in source.load(&self.env_settings_uri_key, &self.map_settings_uri_key)? {
                if layer.values.is_empty() {
                    continue;
                }
                if layer.name == "map" {
                    layer.name = unique_name(&layers, "map");
                } else if layers.iter().any(|l| l.name == layer.name) {
                    tracing::warn!(
                        name = %layer.name,
                        "source appears more than once in the settings priority list, keeping the first"
                    );
                    continue;
                }
                layers.push(layer);
            }
        }

        Ok(Settings {
            layers,
            case_sensitive: self.case_sensitive,
            policy: self.policy,
        })
    }
}

fn unique_name(layers: &[Layer], prefix: &str) -> String {
    let mut i = 0;
    loop {
        let name = format!("{prefix}_{i}");
        if !layers.iter().any(|l| l.name == name) {
            return name;
        }
        i += 1;
    }
}

/// Layered settings resolver.
///
/// The first source in search order containing a key determines the
/// result. Every lookup rescans the layers; nothing is cached.
#[derive(Debug, Clone)]
pub struct Settings {
    layers: Vec<Layer>,
    case_sensitive: bool,
    policy: MissPolicy,
}

impl Settings {
    /// Start building a resolver.
    #[must_use]
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// The loaded layers, in search order.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Resolve a key to its raw value.
    ///
    /// A miss resolves per the configured [`MissPolicy`]: `Ok(None)` for
    /// `Ignore` and `Warn`, an error for `Raise`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingKey`] on a miss under [`MissPolicy::Raise`].
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        self.get_with(key, Lookup::default())
    }

    /// Resolve a key with per-call overrides.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingKey`] on a miss under [`MissPolicy::Raise`].
    pub fn get_with(&self, key: &str, lookup: Lookup) -> Result<Option<Value>> {
        let case_sensitive = lookup.case_sensitive.unwrap_or(self.case_sensitive);
        let policy = lookup.policy.unwrap_or(self.policy);

        if let Some(value) = self.find(key, case_sensitive) {
            return Ok(Some(value.clone()));
        }

        match policy {
            MissPolicy::Ignore => Ok(None),
            MissPolicy::Warn => {
                tracing::warn!(key, "setting is missing from every source");
                Ok(None)
            }
            MissPolicy::Raise => Err(Error::missing_key(key)),
        }
    }

    /// Whether any source contains the key. Never warns or errors.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.find(key, self.case_sensitive).is_some()
    }

    /// Union of keys across all layers, in first-occurrence order.
    ///
    /// In case-insensitive mode keys are yielded lowercased and
    /// deduplicated case-insensitively.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut seen = indexmap::IndexSet::new();
        for layer in &self.layers {
            for key in layer.values.keys() {
                let key = if self.case_sensitive {
                    key.clone()
                } else {
                    key.to_lowercase()
                };
                seen.insert(key);
            }
        }
        seen.into_iter().collect()
    }

    /// Number of distinct keys across all layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    /// Whether no source contributed any key.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(|layer| layer.values.is_empty())
    }

    fn find(&self, key: &str, case_sensitive: bool) -> Option<&Value> {
        // Folds with full Unicode lowercasing, the same as keys() and
        // extract(), so every key they yield is resolvable.
        let folded = (!case_sensitive).then(|| key.to_lowercase());
        for layer in &self.layers {
            if let Some(folded) = folded.as_deref() {
                let mut matches = layer
                    .values
                    .iter()
                    .filter(|(k, _)| k.to_lowercase() == folded);
                if let Some((_, value)) = matches.next() {
                    if matches.next().is_some() {
                        tracing::warn!(
                            key,
                            layer = %layer.name,
                            "more than one case-insensitive match, using the first"
                        );
                    }
                    return Some(value);
                }
            } else if let Some(value) = layer.values.get(key) {
                return Some(value);
            }
        }
        None
    }

    fn cast_opt<T>(
        &self,
        key: &str,
        cast: impl FnOnce(&Value) -> std::result::Result<T, CastError>,
    ) -> Result<Option<T>> {
        match self.get(key)? {
            Some(value) => cast(&value).map(Some).map_err(Error::from),
            None => Ok(None),
        }
    }

    fn cast_or<T>(
        &self,
        key: &str,
        default: T,
        cast: impl FnOnce(&Value) -> std::result::Result<T, CastError>,
    ) -> Result<T> {
        let lookup = Lookup {
            policy: Some(MissPolicy::Ignore),
            ..Lookup::default()
        };
        match self.get_with(key, lookup)? {
            Some(value) => cast(&value).map_err(Error::from),
            None => Ok(default),
        }
    }

    /// Resolve a key as a string.
    ///
    /// # Errors
    ///
    /// Returns an error on a coercion failure, or on a miss under
    /// [`MissPolicy::Raise`].
    pub fn get_str(&self, key: &str) -> Result<Option<String>> {
        self.cast_opt(key, cast_str)
    }

    /// Resolve a key as a string, with `default` on a miss.
    ///
    /// # Errors
    ///
    /// Returns an error only on a coercion failure; a miss never errors.
    pub fn get_str_or(&self, key: &str, default: impl Into<String>) -> Result<String> {
        self.cast_or(key, default.into(), cast_str)
    }

    /// Resolve a key as an integer.
    ///
    /// # Errors
    ///
    /// Returns an error on a coercion failure, or on a miss under
    /// [`MissPolicy::Raise`].
    pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
        self.cast_opt(key, cast_int)
    }

    /// Resolve a key as an integer, with `default` on a miss.
    ///
    /// # Errors
    ///
    /// Returns an error only on a coercion failure; a miss never errors.
    pub fn get_int_or(&self, key: &str, default: i64) -> Result<i64> {
        self.cast_or(key, default, cast_int)
    }

    /// Resolve a key as a float.
    ///
    /// # Errors
    ///
    /// Returns an error on a coercion failure, or on a miss under
    /// [`MissPolicy::Raise`].
    pub fn get_float(&self, key: &str) -> Result<Option<f64>> {
        self.cast_opt(key, cast_float)
    }

    /// Resolve a key as a float, with `default` on a miss.
    ///
    /// # Errors
    ///
    /// Returns an error only on a coercion failure; a miss never errors.
    pub fn get_float_or(&self, key: &str, default: f64) -> Result<f64> {
        self.cast_or(key, default, cast_float)
    }

    /// Resolve a key as a boolean, recognizing common truthy and falsy
    /// spellings.
    ///
    /// # Errors
    ///
    /// Returns an error on a coercion failure, or on a miss under
    /// [`MissPolicy::Raise`].
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        self.cast_opt(key, cast_bool)
    }

    /// Resolve a key as a boolean, with `default` on a miss.
    ///
    /// # Errors
    ///
    /// Returns an error only on a coercion failure; a miss never errors.
    pub fn get_bool_or(&self, key: &str, default: bool) -> Result<bool> {
        self.cast_or(key, default, cast_bool)
    }

    /// Resolve a key as a list, splitting strings on `,`.
    ///
    /// # Errors
    ///
    /// Returns an error on a coercion failure, or on a miss under
    /// [`MissPolicy::Raise`].
    pub fn get_list(&self, key: &str) -> Result<Option<Vec<Value>>> {
        self.get_list_with(key, ',')
    }

    /// Resolve a key as a list, with `default` on a miss.
    ///
    /// # Errors
    ///
    /// Returns an error only on a coercion failure; a miss never errors.
    pub fn get_list_or(&self, key: &str, default: Vec<Value>) -> Result<Vec<Value>> {
        self.cast_or(key, default, |value| cast_list(value, ','))
    }

    /// Resolve a key as a list, splitting strings on `delimiter`.
    ///
    /// # Errors
    ///
    /// Returns an error on a coercion failure, or on a miss under
    /// [`MissPolicy::Raise`].
    pub fn get_list_with(&self, key: &str, delimiter: char) -> Result<Option<Vec<Value>>> {
        self.cast_opt(key, |value| cast_list(value, delimiter))
    }

    /// Resolve a key as a deserialized object or array, parsing strings
    /// as JSON first and YAML second.
    ///
    /// # Errors
    ///
    /// Returns an error on a coercion failure, or on a miss under
    /// [`MissPolicy::Raise`].
    pub fn get_serialized(&self, key: &str) -> Result<Option<Value>> {
        self.cast_opt(key, cast_serialized)
    }

    /// Resolve a key as a deserialized object or array, with `default`
    /// on a miss.
    ///
    /// # Errors
    ///
    /// Returns an error only on a coercion failure; a miss never errors.
    pub fn get_serialized_or(&self, key: &str, default: Value) -> Result<Value> {
        self.cast_or(key, default, cast_serialized)
    }

    /// Alias for [`Self::get_serialized`], for dictionary-shaped values.
    ///
    /// # Errors
    ///
    /// Returns an error on a coercion failure, or on a miss under
    /// [`MissPolicy::Raise`].
    pub fn get_object(&self, key: &str) -> Result<Option<Value>> {
        self.get_serialized(key)
    }

    /// Alias for [`Self::get_serialized_or`].
    ///
    /// # Errors
    ///
    /// Returns an error only on a coercion failure; a miss never errors.
    pub fn get_object_or(&self, key: &str, default: Value) -> Result<Value> {
        self.get_serialized_or(key, default)
    }

    /// Resolve a key as a parsed URL.
    ///
    /// # Errors
    ///
    /// Returns an error on a coercion failure, or on a miss under
    /// [`MissPolicy::Raise`].
    pub fn get_uri(&self, key: &str) -> Result<Option<Url>> {
        self.cast_opt(key, cast_uri)
    }

    /// Resolve a key as a parsed URL, with `default` on a miss.
    ///
    /// # Errors
    ///
    /// Returns an error only on a coercion failure; a miss never errors.
    pub fn get_uri_or(&self, key: &str, default: Url) -> Result<Url> {
        self.cast_or(key, default, cast_uri)
    }

    /// Merge all layers into one object (first match wins per key) and
    /// deserialize it into a typed struct.
    ///
    /// In case-insensitive mode the merged keys are lowercased, so the
    /// target's field names should be lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Extract`] when the merged settings do not
    /// deserialize into `T`.
    pub fn extract<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        let mut merged = serde_json::Map::new();
        for layer in &self.layers {
            for (key, value) in &layer.values {
                let key = if self.case_sensitive {
                    key.clone()
                } else {
                    key.to_lowercase()
                };
                merged.entry(key).or_insert_with(|| value.clone());
            }
        }
        serde_json::from_value(Value::Object(merged)).map_err(|e| Error::Extract(e.to_string()))
    }

    /// Resolve a key as a worker count relative to the CPU count.
    ///
    /// See [`crate::value::parse_workers`] for the expression grammar.
    ///
    /// # Errors
    ///
    /// Returns an error on a coercion failure, or on a miss under
    /// [`MissPolicy::Raise`].
    pub fn get_workers(&self, key: &str) -> Result<Option<usize>> {
        self.cast_opt(key, parse_workers)
    }

    /// Resolve a key as a worker count, with `default` on a miss.
    ///
    /// # Errors
    ///
    /// Returns an error only on a coercion failure; a miss never errors.
    pub fn get_workers_or(&self, key: &str, default: usize) -> Result<usize> {
        self.cast_or(key, default, parse_workers)
    }
}
