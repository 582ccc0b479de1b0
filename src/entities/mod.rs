//! SeaORM entities for the employee management schema.

pub mod department;
pub mod employee;
pub mod position;
pub mod prelude;
