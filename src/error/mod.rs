//! Error types and Result aliases for strata.
//!
//! This module defines the error hierarchy used throughout the crate.
//! All public functions return `Result<T, Error>` or `Result<T>`.

use thiserror::Error;

/// Result type alias using strata's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for settings operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A setting key was absent from every source.
    #[error("the \"{0}\" setting is missing")]
    MissingKey(String),

    /// Source loading error.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Type coercion error.
    #[error("cast error: {0}")]
    Cast(#[from] CastError),

    /// Typed extraction error.
    #[error("extraction error: {0}")]
    Extract(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading a source into a layer.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The file extension maps to no known settings format.
    #[error("unknown settings format '{extension}' for <{uri}>")]
    UnknownFormat { uri: String, extension: String },

    /// A remote or local URI could not be read.
    #[error("failed to fetch <{uri}>: {reason}")]
    Fetch { uri: String, reason: String },

    /// The source content did not parse as its format.
    #[error("failed to parse <{uri}> as {format}: {reason}")]
    Parse {
        uri: String,
        format: &'static str,
        reason: String,
    },

    /// The parsed document was not a mapping at the top level.
    #[error("settings in <{uri}> must be a mapping at the top level")]
    NotAMapping { uri: String },
}

/// Errors raised while coercing a value to a requested type.
#[derive(Error, Debug)]
pub enum CastError {
    /// The value's kind cannot be coerced to the target type.
    #[error("expected {expected}, found {found}")]
    WrongKind {
        expected: &'static str,
        found: &'static str,
    },

    /// A string value failed to parse as the target type.
    #[error("unable to parse '{value}' as {target}")]
    Unparseable { value: String, target: &'static str },

    /// A worker-count expression did not match the supported grammar.
    #[error("unable to parse worker expression '{0}'")]
    Workers(String),
}

impl Error {
    /// Create a missing-key error.
    pub fn missing_key(key: impl Into<String>) -> Self {
        Self::MissingKey(key.into())
    }
}

impl SourceError {
    /// Create a fetch error.
    pub fn fetch(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(uri: impl Into<String>, format: &'static str, reason: impl Into<String>) -> Self {
        Self::Parse {
            uri: uri.into(),
            format,
            reason: reason.into(),
        }
    }
}

impl CastError {
    /// Create an unparseable-string error.
    pub fn unparseable(value: impl Into<String>, target: &'static str) -> Self {
        Self::Unparseable {
            value: value.into(),
            target,
        }
    }
}
