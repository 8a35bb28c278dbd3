//! Database layer - connection pool, schema, and repositories
//!
//! # Design Principles
//!
//! - Connection pool with explicit limits - no Arc<Mutex<Connection>>
//! - Handlers see repository traits, never sqlx
//! - Rely on DB constraints, translate violations - no check-then-insert

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::{create_pool, create_pool_with_options};
pub use repos::*;
