//! Strata — layered settings lookup.
//!
//! Resolves named configuration values by searching an ordered list of
//! sources (environment, in-memory maps such as parsed CLI arguments,
//! and JSON/YAML/TOML files addressed by path or URI) and coercing the
//! first match to a requested type. A miss resolves to a caller default
//! or an error, per a configurable policy.
//!
//! # Example
//!
//! ```
//! use strata::{MissPolicy, Settings, Source};
//!
//! let args = Source::map([("port", "8080"), ("debug", "true")]);
//! let settings = Settings::builder()
//!     .search_first([])
//!     .source(args)
//!     .miss_policy(MissPolicy::Ignore)
//!     .build()?;
//!
//! assert_eq!(settings.get_int("port")?, Some(8080));
//! assert_eq!(settings.get_bool("DEBUG")?, Some(true));
//! assert_eq!(settings.get_str_or("host", "127.0.0.1")?, "127.0.0.1");
//! # Ok::<(), strata::Error>(())
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod settings;
pub mod source;
pub mod value;

pub use error::{CastError, Error, Result, SourceError};
pub use settings::{Lookup, MissPolicy, Settings, SettingsBuilder};
pub use source::{Layer, Source, DEFAULT_ENV_SETTINGS_URI_KEY, DEFAULT_MAP_SETTINGS_URI_KEY};
pub use value::{cpu_count, parse_workers, Value};
