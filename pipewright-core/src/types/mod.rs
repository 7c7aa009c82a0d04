//! Core types for Pipewright.
//!
//! - `ResourceId`: user-facing id validated against RFC-1034 label rules
//! - `Uid`: server-generated permalink
//! - `Namespace`: owner of a resource (user or organization)
//! - `View` / `RunStatus`: enumerations shared by the API surface

mod ids;
mod namespace;
mod view;

pub use ids::{ResourceId, Uid, MAX_ID_LENGTH};
pub use namespace::{Namespace, NamespaceKind};
pub use view::{RunStatus, View};
