use super::{Checker, MAX_DESCRIPTION_LEN, MAX_NAME_LEN, ValidationErrors};
use crate::models::PositionDto;

/// Validate a position before create or update.
pub fn validate_position(dto: &PositionDto) -> Result<(), ValidationErrors> {
    let mut checker = Checker::default();
    checker.bounded_text("title", &dto.title, MAX_NAME_LEN);
    checker.bounded_text("description", &dto.description, MAX_DESCRIPTION_LEN);
    checker.finish()
}
