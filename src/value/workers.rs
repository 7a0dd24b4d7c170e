//! Worker-count expressions relative to the CPU count.
//!
//! Settings like `n_jobs` are often written as a function of the machine
//! size rather than a fixed number. The supported grammar, for a machine
//! with N CPUs:
//!
//! * `"4"` — exactly 4
//! * `"n"` — N
//! * `"2n"` or `"2 * n"` — 2N
//! * `"0.5n"` — N/2
//! * a bare fraction below 1 (e.g. `"0.5"`) also scales N
//!
//! Results are floored to an integer and clamped to at least 1.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{kind, Value};
use crate::error::CastError;

static WORKERS_EXPR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d*(?:\.\d*)?)?(\s*\*?\s*n)?$").expect("workers regex"));

/// Number of CPUs available to this process, falling back to 1 when it
/// cannot be determined.
#[must_use]
pub fn cpu_count() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}

/// Parse a worker-count setting.
///
/// Accepts integer and float values directly, or a string expression per
/// the module grammar. Non-positive results are clamped to 1 with a
/// warning.
///
/// # Errors
///
/// Returns a [`CastError`] when the value is neither a number nor a
/// string matching the expression grammar.
pub fn parse_workers(value: &Value) -> Result<usize, CastError> {
    let count = match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| CastError::Workers(n.to_string()))?,
        Value::String(s) => parse_expression(s)?,
        other => {
            return Err(CastError::WrongKind {
                expected: "worker count",
                found: kind(other),
            })
        }
    };

    let count = count.floor() as i64;
    if count <= 0 {
        tracing::warn!(count, "worker count is not positive, using 1");
        return Ok(1);
    }
    Ok(count as usize)
}

fn parse_expression(raw: &str) -> Result<f64, CastError> {
    let caps = WORKERS_EXPR
        .captures(raw.trim())
        .ok_or_else(|| CastError::Workers(raw.to_string()))?;

    let scale = match caps.get(1).map(|m| m.as_str()).filter(|s| !s.is_empty()) {
        Some(digits) => digits
            .parse::<f64>()
            .map_err(|_| CastError::Workers(raw.to_string()))?,
        None => 1.0,
    };

    let cpus = cpu_count() as f64;
    if caps.get(2).is_some() || scale < 1.0 {
        Ok(scale * cpus)
    } else {
        Ok(scale)
    }
}
