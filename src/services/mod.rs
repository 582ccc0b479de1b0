//! Domain services: validate, fetch, mutate, stage, commit.
//!
//! A service borrows the unit of work of the current request and performs
//! one operation per call. Nothing is staged or committed when validation
//! fails or the target row is missing.

mod department;
mod employee;
mod position;

pub use department::DepartmentService;
pub use employee::EmployeeService;
pub use position::PositionService;

use crate::db::{PersistenceError, StagedInsert};

/// Id the store assigned to a committed insert.
fn assigned_id(staged: &StagedInsert, entity: &'static str) -> Result<i32, PersistenceError> {
    staged.id().ok_or(PersistenceError::MissingKey(entity))
}
