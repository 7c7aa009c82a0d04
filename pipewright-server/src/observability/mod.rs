//! Logging setup for the service and the command line.
//!
//! The output format is chosen by `PIPEWRIGHT_LOG_FORMAT`:
//! - `json` - structured JSON, one event per line
//! - `pretty` - multi-line human-readable output (default on a TTY)
//! - `compact` - single-line output
//!
//! The filter comes from `PIPEWRIGHT_LOG_LEVEL`, then `RUST_LOG`, then `info`.
//!
//! ```ignore
//! use pipewright_server::observability::{init_tracing, TracingConfig};
//!
//! let _guard = init_tracing(TracingConfig::from_env())?;
//! ```

mod config;
mod tracing_setup;

pub use config::{LogFormat, TracingConfig, TracingConfigBuilder};
pub use tracing_setup::{init_tracing, TracingGuard};

/// Span for one trigger of a pipeline.
#[macro_export]
macro_rules! trigger_span {
    ($pipeline:expr, $run_uid:expr) => {
        tracing::info_span!(
            "pipeline_trigger",
            pipeline = %$pipeline,
            pipeline_run_uid = %$run_uid
        )
    };
}
