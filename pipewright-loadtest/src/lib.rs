//! Pipewright load-test harness.
//!
//! Runs scenario suites against a Pipewright server with a configurable
//! number of concurrent virtual users. Every assertion is a named check;
//! the run ends with per-check pass and fail counts.
//!
//! # Example
//!
//! ```no_run
//! use pipewright_loadtest::{run, LoadTestConfig, Suite};
//!
//! # async fn example() -> pipewright_loadtest::Result<()> {
//! let config = LoadTestConfig::new("http://localhost:8080")
//!     .with_api_key("admin-key")
//!     .with_vus(4)
//!     .with_iterations(10)
//!     .with_suites(vec![Suite::Pipelines, Suite::Triggers]);
//!
//! let summary = run(config).await?;
//! println!("{}", summary);
//! assert!(summary.is_success());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod checks;
pub mod config;
pub mod error;
pub mod runner;
pub mod suites;
pub mod summary;
pub mod vu;

pub use checks::{CheckCounts, Checks};
pub use config::LoadTestConfig;
pub use error::{LoadTestError, Result};
pub use runner::run;
pub use suites::Suite;
pub use summary::Summary;
pub use vu::VirtualUser;
