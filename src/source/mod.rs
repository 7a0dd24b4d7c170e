//! Source adapters for settings lookup.
//!
//! A source is a place settings may be read from. Loading a source
//! produces one or more named [`Layer`]s; the resolver searches layers in
//! order and the first one containing a key wins.
//!
//! Supported sources:
//! - Environment (`Source::Env`): a snapshot of the process environment
//! - Settings-URI autoload (`Source::EnvSettingsUri`): the file named by
//!   `SETTINGS_URI` in the environment, when present
//! - URIs/files (`Source::Uri`): JSON, YAML, and TOML documents, local or
//!   `http(s)://`, optionally gzip-compressed
//! - In-memory maps (`Source::Map`): parsed CLI arguments and other
//!   dictionary-shaped data

mod env;
mod file;
mod map;

use indexmap::IndexMap;

use crate::error::Result;
use crate::value::Value;

/// Default environment key naming a settings URI to autoload.
pub const DEFAULT_ENV_SETTINGS_URI_KEY: &str = "SETTINGS_URI";

/// Default map key naming a settings URI to autoload.
pub const DEFAULT_MAP_SETTINGS_URI_KEY: &str = "settings_uri";

/// A named bundle of settings loaded from one source.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Diagnostic name, unique within one resolver.
    pub name: String,
    /// Key/value entries in source order.
    pub values: IndexMap<String, Value>,
}

/// A place settings may be read from.
#[derive(Debug, Clone)]
pub enum Source {
    /// Snapshot of the process environment taken at build time.
    Env,
    /// The settings file named by the settings-URI key in the
    /// environment, contributing nothing when the key is unset.
    EnvSettingsUri,
    /// A local path or `file://`/`http://`/`https://` URI.
    Uri(String),
    /// An in-memory map of settings.
    Map(IndexMap<String, Value>),
}

impl Source {
    /// Build a map source from key/value pairs.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Load this source into zero or more layers.
    ///
    /// A map source containing the settings-URI key yields the referenced
    /// file as an extra layer ahead of the map itself.
    pub(crate) fn load(&self, env_uri_key: &str, map_uri_key: &str) -> Result<Vec<Layer>> {
        match self {
            Self::Env => {
                let values = env::snapshot();
                tracing::debug!(count = values.len(), "loaded settings from the environment");
                Ok(vec![Layer {
                    name: "env".to_string(),
                    values,
                }])
            }
            Self::EnvSettingsUri => match env::find(env_uri_key) {
                Some(uri) => {
                    tracing::debug!(key = env_uri_key, %uri, "found settings URI in the environment");
                    let values = file::load_uri(&uri)?;
                    Ok(vec![Layer { name: uri, values }])
                }
                None => Ok(Vec::new()),
            },
            Self::Uri(uri) => {
                let values = file::load_uri(uri)?;
                tracing::debug!(count = values.len(), %uri, "loaded settings from URI");
                Ok(vec![Layer {
                    name: uri.clone(),
                    values,
                }])
            }
            Self::Map(entries) => {
                let mut layers = Vec::new();
                if let Some(uri) = map::settings_uri(entries, map_uri_key) {
                    tracing::debug!(key = map_uri_key, %uri, "found settings URI in map source");
                    let values = file::load_uri(&uri)?;
                    layers.push(Layer { name: uri, values });
                }
                tracing::debug!(count = entries.len(), "loaded settings from map source");
                layers.push(Layer {
                    name: "map".to_string(),
                    values: entries.clone(),
                });
                Ok(layers)
            }
        }
    }
}

impl From<&str> for Source {
    fn from(uri: &str) -> Self {
        Self::Uri(uri.to_string())
    }
}

impl From<String> for Source {
    fn from(uri: String) -> Self {
        Self::Uri(uri)
    }
}

impl From<&std::path::Path> for Source {
    fn from(path: &std::path::Path) -> Self {
        Self::Uri(path.display().to_string())
    }
}

impl From<std::path::PathBuf> for Source {
    fn from(path: std::path::PathBuf) -> Self {
        Self::Uri(path.display().to_string())
    }
}

impl From<IndexMap<String, Value>> for Source {
    fn from(entries: IndexMap<String, Value>) -> Self {
        Self::Map(entries)
    }
}
