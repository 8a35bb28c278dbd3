//! HTTP server layer
//!
//! Axum server with:
//! - CORS (localhost only by default)
//! - Request tracing and timeouts
//! - Graceful shutdown
//! - JSON error responses
//! - Hypermedia links built in one place (`links`)

pub mod server;
pub mod error;
pub mod extractors;
pub mod links;
pub mod routes;

pub use server::{build_router, run_server, AppState, ServerConfig, ServerError};
pub use error::ApiError;
pub use links::{BaseUrl, ResourceKind};
