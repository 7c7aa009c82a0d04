//! HTTP request handlers.

pub mod catalog;
pub mod connections;
pub mod health;
pub mod pipelines;
pub mod runs;
pub mod triggers;
