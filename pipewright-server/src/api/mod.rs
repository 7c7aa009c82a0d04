//! REST API for Pipewright.
//!
//! Pure hyper 1.x, HTTP/1.1:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      ApiServer                           │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  │
//! │  │   router     │──│   handlers   │──│    state     │  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  │
//! │                            │                             │
//! │                            ▼                             │
//! │  ┌──────────────────────────────────────────────────┐  │
//! │  │    PipelineController / ConnectionController      │  │
//! │  └──────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use pipewright_server::api::{ApiServer, AppState, ServerConfig};
//! use pipewright_server::config::ServiceConfig;
//!
//! # async fn run() -> pipewright_core::Result<()> {
//! let config = ServiceConfig::default();
//! let mut server = ApiServer::new(ServerConfig::new("0.0.0.0", 8080), AppState::new(&config));
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

mod error;
pub mod handlers;
mod request;
mod response;
mod router;
mod server;
mod state;

pub use error::ApiError;
pub use request::Query;
pub use router::API_PREFIX;
pub use server::{ApiServer, ServerConfig, ServerHandle};
pub use state::AppState;
