//! Position DTO.

use serde::{Deserialize, Serialize};

/// Position as exchanged with API callers.
///
/// `employee_count` is computed when mapping from the store and ignored on
/// input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PositionDto {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub employee_count: u64,
}
