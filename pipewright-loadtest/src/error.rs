//! Error types for the load-test harness.

use pipewright_client::ClientError;
use thiserror::Error;

/// Errors that stop a load-test run.
#[derive(Debug, Error)]
pub enum LoadTestError {
    /// Configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Suite name not recognised.
    #[error("Unknown suite '{0}' (expected one of: pipelines, pagination, triggers, connections, definitions, auth)")]
    UnknownSuite(String),

    /// Request could not be sent or its response not read.
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    /// A virtual user task panicked or was cancelled.
    #[error("Virtual user {vu} did not finish: {cause}")]
    VirtualUser {
        /// Virtual user number.
        vu: usize,
        /// Join failure.
        cause: String,
    },
}

/// Result type for load-test operations.
pub type Result<T> = std::result::Result<T, LoadTestError>;
