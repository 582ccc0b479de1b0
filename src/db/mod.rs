//! Persistence: repositories, units of work, and store connections.

pub mod connection;
pub mod memory;
pub mod repository;
pub mod unit_of_work;

use std::time::Duration;

use sea_orm::DbErr;
use thiserror::Error;

pub use connection::{TableCounts, connect, ensure_schema, get_table_counts, get_version, test_connection};
pub use memory::{CommitRecord, MemoryStore, MemoryUnitOfWork};
pub use repository::{EmployeeRepository, Repository, StagedInsert};
pub use unit_of_work::{SeaUnitOfWork, SeaUnitOfWorkFactory, UnitOfWork, UnitOfWorkFactory};

/// Store-level failure while reading or committing.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The database rejected the operation or could not be reached.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// The operation did not finish within the configured command timeout.
    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    /// A staged change broke a store constraint.
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// A committed insert came back without a primary key.
    #[error("Store returned no key for inserted {0}")]
    MissingKey(&'static str),
}
