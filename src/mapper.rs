//! Conversions between stored entities and transport DTOs.
//!
//! Derived DTO fields are passed in explicitly by the caller, who looks them
//! up in the store: employee counts for departments and positions, and the
//! department name and position title shown on an employee.

use chrono::{NaiveDate, Utc};

use crate::entities::{department, employee, position};
use crate::models::{DepartmentDto, EmployeeDto, PositionDto};

pub fn department_to_dto(model: department::Model, employee_count: u64) -> DepartmentDto {
    DepartmentDto {
        id: model.id,
        name: model.name,
        description: model.description,
        employee_count,
    }
}

pub fn department_from_dto(dto: &DepartmentDto) -> department::Model {
    department::Model {
        id: dto.id,
        name: dto.name.clone(),
        description: dto.description.clone(),
    }
}

pub fn position_to_dto(model: position::Model, employee_count: u64) -> PositionDto {
    PositionDto {
        id: model.id,
        title: model.title,
        description: model.description,
        employee_count,
    }
}

pub fn position_from_dto(dto: &PositionDto) -> position::Model {
    position::Model {
        id: dto.id,
        title: dto.title.clone(),
        description: dto.description.clone(),
    }
}

/// Map an employee, denormalizing the names of its department and position
/// when they were found.
pub fn employee_to_dto(
    model: employee::Model,
    department: Option<&department::Model>,
    position: Option<&position::Model>,
) -> EmployeeDto {
    EmployeeDto {
        id: model.id,
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        phone_number: model.phone_number,
        department_id: model.department_id,
        position_id: model.position_id,
        salary: model.salary,
        hire_date: Some(model.hire_date),
        department_name: department.map(|d| d.name.clone()),
        position_name: position.map(|p| p.title.clone()),
    }
}

/// Build a new employee entity. A missing hire date becomes `today`.
pub fn employee_from_dto(dto: &EmployeeDto, today: NaiveDate) -> employee::Model {
    employee::Model {
        id: dto.id,
        first_name: dto.first_name.clone(),
        last_name: dto.last_name.clone(),
        email: dto.email.clone(),
        phone_number: dto.phone_number.clone(),
        department_id: dto.department_id,
        position_id: dto.position_id,
        salary: dto.salary,
        hire_date: dto.hire_date.unwrap_or(today),
    }
}

/// Overwrite the mutable fields of a stored employee with the DTO's values.
///
/// Id and hire date are kept.
pub fn apply_employee_update(model: &mut employee::Model, dto: &EmployeeDto) {
    model.first_name.clone_from(&dto.first_name);
    model.last_name.clone_from(&dto.last_name);
    model.email.clone_from(&dto.email);
    model.phone_number.clone_from(&dto.phone_number);
    model.department_id = dto.department_id;
    model.position_id = dto.position_id;
    model.salary = dto.salary;
}

pub fn apply_department_update(model: &mut department::Model, dto: &DepartmentDto) {
    model.name.clone_from(&dto.name);
    model.description.clone_from(&dto.description);
}

pub fn apply_position_update(model: &mut position::Model, dto: &PositionDto) {
    model.title.clone_from(&dto.title);
    model.description.clone_from(&dto.description);
}

/// Today's date in UTC, the default hire date.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
