//! Tracing subscriber setup.

use super::config::LogFormat;
use super::TracingConfig;
use anyhow::{Context, Result};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Keeps logging alive; hold it for the lifetime of the program.
pub struct TracingGuard {
    _private: (),
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        tracing::debug!("Tracing shut down");
    }
}

/// Install the global subscriber described by `config`.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: TracingConfig) -> Result<TracingGuard> {
    let filter = EnvFilter::try_new(config.log_filter()).unwrap_or_else(|_| EnvFilter::new("info"));

    match config.log_format() {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_file(config.include_location())
                        .with_line_number(config.include_location())
                        .with_target(config.include_target())
                        .with_span_events(FmtSpan::CLOSE)
                        .flatten_event(true),
                )
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .pretty()
                        .with_file(config.include_location())
                        .with_line_number(config.include_location())
                        .with_target(config.include_target()),
                )
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .compact()
                        .with_file(config.include_location())
                        .with_line_number(config.include_location())
                        .with_target(config.include_target()),
                )
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
    }

    Ok(TracingGuard { _private: () })
}
