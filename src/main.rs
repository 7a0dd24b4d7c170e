//! strata — resolve settings keys from layered sources.
//!
//! Entry point for the strata CLI.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Registry,
};

use strata::value::{cast_bool, cast_float, cast_int, cast_list, cast_serialized, cast_str};
use strata::{Lookup, MissPolicy, Settings, Value};

/// strata — layered settings lookup.
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "STRATA_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, env = "STRATA_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve one key and print its value
    Get {
        /// Settings key to resolve
        key: String,

        /// Settings sources (paths or URIs), highest priority first
        #[arg(short, long = "source", env = "STRATA_SOURCES", value_delimiter = ',')]
        sources: Vec<String>,

        /// Skip the environment and SETTINGS_URI search-first sources
        #[arg(long)]
        no_env: bool,

        /// Coerce the value to this type before printing
        #[arg(long = "type", value_enum, default_value = "str")]
        value_type: OutputType,

        /// Fallback when the key is missing from every source
        #[arg(long)]
        default: Option<String>,

        /// Exit with an error when the key is missing and no default is given
        #[arg(long)]
        strict: bool,

        /// Match key case exactly
        #[arg(long)]
        case_sensitive: bool,
    },
    /// Print the union of keys across all sources
    Keys {
        /// Settings sources (paths or URIs), highest priority first
        #[arg(short, long = "source", env = "STRATA_SOURCES", value_delimiter = ',')]
        sources: Vec<String>,

        /// Skip the environment and SETTINGS_URI search-first sources
        #[arg(long)]
        no_env: bool,

        /// Keep key casing as the sources spell it
        #[arg(long)]
        case_sensitive: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputType {
    Str,
    Int,
    Float,
    Bool,
    List,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);

    match cli.command {
        Command::Get {
            key,
            sources,
            no_env,
            value_type,
            default,
            strict,
            case_sensitive,
        } => {
            let settings = build_settings(&sources, no_env, case_sensitive, strict)?;
            run_get(&settings, &key, value_type, default.as_deref())
        }
        Command::Keys {
            sources,
            no_env,
            case_sensitive,
        } => {
            let settings = build_settings(&sources, no_env, case_sensitive, false)?;
            for key in settings.keys() {
                println!("{key}");
            }
            Ok(())
        }
    }
}

fn build_settings(
    sources: &[String],
    no_env: bool,
    case_sensitive: bool,
    strict: bool,
) -> anyhow::Result<Settings> {
    let mut builder = Settings::builder().case_sensitive(case_sensitive).miss_policy(
        if strict {
            MissPolicy::Raise
        } else {
            MissPolicy::Ignore
        },
    );
    if no_env {
        builder = builder.search_first([]);
    }
    for source in sources {
        builder = builder.source(source.as_str());
    }
    Ok(builder.build()?)
}

fn run_get(
    settings: &Settings,
    key: &str,
    value_type: OutputType,
    default: Option<&str>,
) -> anyhow::Result<()> {
    // A given default always wins over the strict policy.
    let lookup = Lookup {
        policy: default.is_some().then_some(MissPolicy::Ignore),
        ..Lookup::default()
    };

    let value = match settings.get_with(key, lookup)? {
        Some(value) => value,
        None => match default {
            Some(fallback) => Value::String(fallback.to_string()),
            None => {
                tracing::debug!(key, "setting not found, nothing to print");
                return Ok(());
            }
        },
    };

    let rendered = match value_type {
        OutputType::Str => cast_str(&value)?,
        OutputType::Int => cast_int(&value)?.to_string(),
        OutputType::Float => cast_float(&value)?.to_string(),
        OutputType::Bool => cast_bool(&value)?.to_string(),
        OutputType::List => serde_json::to_string(&cast_list(&value, ',')?)?,
        OutputType::Json => serde_json::to_string_pretty(&cast_serialized(&value)?)?,
    };
    println!("{rendered}");
    Ok(())
}

/// Initialize tracing with an env-filter and optional JSON output.
fn init_tracing(level: &str, json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        let json_layer = fmt::layer().json().with_target(true);
        Registry::default().with(env_filter).with(json_layer).init();
    } else {
        let fmt_layer = fmt::layer().with_target(true);
        Registry::default().with(env_filter).with(fmt_layer).init();
    }

    tracing::debug!("tracing initialized: level={}, json={}", level, json);
}
