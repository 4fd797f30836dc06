//! Logging initialisation via tracing-subscriber.
//!
//! Call [`init`] once at startup, after the effective level is resolved.
//! A bare level such as `debug` applies to this crate; dependencies (hyper,
//! reqwest, tower) stay at `warn` unless the level is quieter than that.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Initialise the global tracing subscriber, writing to stderr.
///
/// If `prefer_level` is `true` (a `-v` flag was given), `level` wins and
/// `RUST_LOG` is only consulted when `level` does not parse. Otherwise
/// `RUST_LOG` wins and `level` is the fallback.
pub fn init(level: &str, prefer_level: bool) -> Result<(), AppError> {
    let filter = build_filter(level, prefer_level)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))
}

/// Expand a bare level into this crate's default directive. Anything else
/// (`target=level` lists, span filters) passes through unchanged.
fn default_directive(level: &str) -> String {
    match level.parse::<LevelFilter>() {
        Ok(filter) => format!("{},{}={filter}", filter.min(LevelFilter::WARN), env!("CARGO_CRATE_NAME")),
        Err(_) => level.to_string(),
    }
}

fn build_filter(level: &str, prefer_level: bool) -> Result<EnvFilter, AppError> {
    let directive = default_directive(level);
    if prefer_level {
        return EnvFilter::try_new(&directive).or_else(|level_err| {
            EnvFilter::try_from_default_env().map_err(|env_err| {
                AppError::Logger(format!(
                    "invalid log level '{level}': {level_err}; RUST_LOG parse failed: {env_err}"
                ))
            })
        });
    }
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&directive))
        .map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}")))
}

/// Parse a bare level string into a [`LevelFilter`]. Used to validate the
/// configured level before the subscriber exists.
pub fn parse_level(level: &str) -> Result<LevelFilter, AppError> {
    if level.is_empty() {
        return Err(AppError::Logger("log level must not be empty".into()));
    }
    level
        .parse::<LevelFilter>()
        .map_err(|_| AppError::Logger(format!("unrecognised log level: '{level}'")))
}
