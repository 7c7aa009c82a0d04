//! Recipe execution: the component runtime, input checking and the executor.

pub mod component;
pub mod components;
pub mod executor;
pub mod inputs;
pub mod jq;

pub use component::{Component, ComponentContext, ComponentFuture, ComponentRegistry};
pub use executor::{Executor, RunOutcome};
pub use inputs::prepare_inputs;
