//! CLI command implementations.

pub mod hash_key;
pub mod loadtest;
pub mod serve;
pub mod version;
