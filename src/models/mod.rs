//! Transport DTOs for departments, employees, and positions.

pub mod department;
pub mod employee;
pub mod position;

pub use department::DepartmentDto;
pub use employee::EmployeeDto;
pub use position::PositionDto;
