//! # Database Operations
//!
//! PostgreSQL connection pooling and schema setup for the seed table.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use bulk_seeder::config::SeederConfig;
//! use bulk_seeder::database::{DatabaseConnection, DatabaseMigrations};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SeederConfig::load()?;
//! let db = DatabaseConnection::connect(&config).await?;
//! DatabaseMigrations::run_all(db.pool()).await?;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod migrations;

pub use connection::DatabaseConnection;
pub use migrations::DatabaseMigrations;
