//! Resources managed by the service and their wire representations.
//!
//! Each resource has a domain struct (owned by the store) and a `*Resource`
//! struct: the camelCase JSON shape returned for a given [`View`](crate::types::View).

mod connection;
mod definition;
mod integration;
mod operation;
mod pipeline;
mod run;

pub use connection::{
    Connection, ConnectionMethod, ConnectionResource, CONNECTION_MASK, REDACTED,
};
pub use definition::{
    ComponentDefinition, ComponentType, DefinitionResource, ReleaseStage, TaskInfo,
};
pub use integration::{Integration, IntegrationResource, OAuthConfig};
pub use operation::{Operation, OperationError, OPERATION_PREFIX};
pub use pipeline::{Pipeline, PipelineResource, PipelineState, PIPELINE_MASK};
pub use run::{ComponentRun, ComponentRunResource, PipelineRun, PipelineRunResource, RunSource};

use chrono::{DateTime, Duration, Utc};

/// Timestamp for an update following `previous`.
///
/// Never equal to or earlier than `previous`, even when the clock has not
/// advanced since.
pub fn advance_time(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}
