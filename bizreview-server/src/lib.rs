//! bizreview-server: REST API for businesses and their reviews
//!
//! Businesses and reviews live in PostgreSQL (or an in-memory store for tests
//! and demos). Every representation carries absolute `self` links; reviews also
//! link to their `business`, and paginated listings link to the `next` page.

pub mod db;
pub mod http;
pub mod models;

pub use db::repos::{BusinessRepo, DbError, MemoryStore, ReviewRepo};
pub use http::{build_router, run_server, AppState, ServerConfig};
