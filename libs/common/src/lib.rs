//! Common library for the slogans workspace
//!
//! This crate provides the database plumbing shared by the API service and
//! the migration tool: connection configuration, pooling with a startup
//! connectivity guard, error types, and a linear migration engine.
//!
//! ```rust,no_run
//! use common::database::{DatabaseConfig, connect_with_retry, health_check};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env()?;
//!     let pool = connect_with_retry(&config).await?;
//!     let is_healthy = health_check(&pool).await?;
//!     println!("Database health check: {}", is_healthy);
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod error;
pub mod migrations;
