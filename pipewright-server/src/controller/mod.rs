//! Resource operations behind the REST handlers.
//!
//! Controllers own validation, persistence and rendering; handlers only
//! parse requests and shape responses.

mod connections;
mod pipelines;

pub use connections::ConnectionController;
pub use pipelines::{PipelineController, TriggerResult};

use pipewright_core::pagination::PageRequest;
use pipewright_core::View;

/// Common parameters of list requests.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Pagination.
    pub page: PageRequest,
    /// Representation detail.
    pub view: View,
    /// Filter expression.
    pub filter: Option<String>,
}

impl ListQuery {
    /// Query with only a view.
    pub fn with_view(view: View) -> Self {
        Self {
            view,
            ..Self::default()
        }
    }
}
