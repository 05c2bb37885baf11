//! Common library for the snippetbox workspace
//!
//! This crate provides the persistence plumbing shared by the services:
//! connection pool configuration, pool initialisation, health checks and the
//! schema migrations for the `snippets` and `users` tables.
//!
//! ```rust,no_run
//! use common::database::{DatabaseConfig, health_check, init_pool, migrate};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::default();
//!     let pool = init_pool(&config).await?;
//!     migrate(&pool).await?;
//!     assert!(health_check(&pool).await?);
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod error;
