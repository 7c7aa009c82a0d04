//! Pipewright Core Library
//!
//! Types shared by the Pipewright service, client and load-test harness:
//! identifiers and namespaces, the recipe model with its reference language,
//! list filtering and pagination, field-mask updates, resource models and
//! API-key authentication.
//!
//! # Example
//!
//! ```
//! use pipewright_core::recipe::{Recipe, ReferenceParser};
//! use serde_json::json;
//!
//! let recipe = Recipe::from_json(json!({
//!     "version": "v1beta",
//!     "variable": { "text": { "format": "string" } },
//!     "component": {
//!         "enc": { "type": "base64", "task": "TASK_ENCODE", "input": { "data": "${variable.text}" } }
//!     },
//!     "output": { "encoded": { "value": "${enc.output.data}" } }
//! }))
//! .unwrap();
//!
//! let refs = ReferenceParser::parse_all("${enc.output.data}").unwrap();
//! assert_eq!(refs[0].root, "enc");
//! assert_eq!(recipe.component_ids().collect::<Vec<_>>(), vec!["enc"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod error;
pub mod filter;
pub mod mask;
pub mod model;
pub mod naming;
pub mod pagination;
pub mod recipe;
pub mod types;

pub use error::{PipewrightError, Result, StatusKind};
pub use types::{Namespace, NamespaceKind, ResourceId, RunStatus, Uid, View};
