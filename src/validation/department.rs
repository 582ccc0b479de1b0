use super::{Checker, MAX_DESCRIPTION_LEN, MAX_NAME_LEN, ValidationErrors};
use crate::models::DepartmentDto;

/// Validate a department before create or update.
pub fn validate_department(dto: &DepartmentDto) -> Result<(), ValidationErrors> {
    let mut checker = Checker::default();
    checker.bounded_text("name", &dto.name, MAX_NAME_LEN);
    checker.bounded_text("description", &dto.description, MAX_DESCRIPTION_LEN);
    checker.finish()
}
