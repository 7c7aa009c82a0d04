//! Scenario suites.
//!
//! Each suite drives one area of the API through a sequence of named
//! checks and deletes whatever it created.

mod auth;
mod connections;
mod definitions;
pub mod fixtures;
mod pagination;
mod pipelines;
mod triggers;

use crate::error::{LoadTestError, Result};
use crate::vu::VirtualUser;
use std::fmt;
use std::str::FromStr;

/// A scenario suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suite {
    /// Pipeline CRUD, validation, rename and look-up.
    Pipelines,
    /// Page sizes, page tokens and filters.
    Pagination,
    /// Sync and async triggers with run history.
    Triggers,
    /// Connection CRUD, redaction and referenced pipelines.
    Connections,
    /// Component definitions, operator definitions and integrations.
    Definitions,
    /// Authentication and namespace authorization.
    Auth,
}

const ALL: [Suite; 6] = [
    Suite::Pipelines,
    Suite::Pagination,
    Suite::Triggers,
    Suite::Connections,
    Suite::Definitions,
    Suite::Auth,
];

impl Suite {
    /// Every suite, in run order.
    pub fn all() -> &'static [Suite] {
        &ALL
    }

    /// Suite name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pipelines => "pipelines",
            Self::Pagination => "pagination",
            Self::Triggers => "triggers",
            Self::Connections => "connections",
            Self::Definitions => "definitions",
            Self::Auth => "auth",
        }
    }

    /// Run one iteration of the suite.
    pub async fn run(self, vu: &VirtualUser) -> Result<()> {
        match self {
            Self::Pipelines => pipelines::run(vu).await,
            Self::Pagination => pagination::run(vu).await,
            Self::Triggers => triggers::run(vu).await,
            Self::Connections => connections::run(vu).await,
            Self::Definitions => definitions::run(vu).await,
            Self::Auth => auth::run(vu).await,
        }
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Suite {
    type Err = LoadTestError;

    fn from_str(s: &str) -> Result<Self> {
        ALL.iter()
            .copied()
            .find(|suite| suite.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LoadTestError::UnknownSuite(s.to_string()))
    }
}
