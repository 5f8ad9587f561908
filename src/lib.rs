#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Bulk Seeder
//!
//! Generates a large run of records and loads it into PostgreSQL as one
//! all-or-nothing transaction.
//!
//! ## Overview
//!
//! Loading happens in two steps:
//!
//! 1. [`planner::plan`] lazily partitions `total_count` records into batches of
//!    at most `batch_size`, in ascending sequence-index order.
//! 2. [`loader::TransactionalLoader`] opens one transaction on a
//!    [`persistence::RecordStore`], bulk-inserts each batch in order, and either
//!    commits everything or rolls everything back on the first failure.
//!
//! The store is always passed in explicitly. [`persistence::PgRecordStore`]
//! writes to PostgreSQL; [`persistence::InMemoryRecordStore`] keeps rows in
//! process and can inject failures, which is how the tests drive the
//! rollback paths.
//!
//! ## Module Organization
//!
//! - [`planner`] - Lazy batch planning
//! - [`loader`] - Transactional batch loading
//! - [`persistence`] - Store trait plus PostgreSQL and in-memory stores
//! - [`models`] - Records, batches, and the persisted row
//! - [`database`] - Connection pooling and schema setup
//! - [`config`] - Layered configuration
//! - [`error`] - Load error kinds
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust
//! use bulk_seeder::loader::TransactionalLoader;
//! use bulk_seeder::persistence::InMemoryRecordStore;
//! use bulk_seeder::planner::plan;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryRecordStore::new();
//! let report = TransactionalLoader::new()
//!     .load(&store, plan(13, 5)?)
//!     .await?;
//!
//! assert_eq!(report.to_string(), "13 records committed");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod loader;
pub mod logging;
pub mod models;
pub mod persistence;
pub mod planner;

pub use config::{ConfigurationError, SeederConfig};
pub use error::{LoadError, Result};
pub use loader::{load, LoadReport, LoadSession, TransactionalLoader};
pub use models::{Batch, NewSeedRecord, Record, SeedRecord};
pub use persistence::{
    InMemoryRecordStore, PersistenceError, PgRecordStore, RecordStore, StoreTransaction,
};
pub use planner::{plan, BatchPlan};
