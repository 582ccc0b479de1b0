pub use super::department::Entity as Departments;
pub use super::employee::Entity as Employees;
pub use super::position::Entity as Positions;
