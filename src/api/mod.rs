//! HTTP API for the intake flow.
//!
//! Routes are nested under `/api/` and wrapped in a small layer stack:
//! CORS → no-store → access log → handler.
//!
//! The router is composable: `intake_api_router()` returns a `Router`
//! that can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::intake_api_router;
pub use server::{start_api_server, ApiServer, ApiServerInfo};
pub use types::ApiContext;
