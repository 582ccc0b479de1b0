//! Employee DTO.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Employee as exchanged with API callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeeDto {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub department_id: i32,
    pub position_id: i32,
    pub salary: Decimal,
    /// Defaults to today (UTC) when omitted on create. Never changed by update.
    pub hire_date: Option<NaiveDate>,

    /// Name of the referenced department, filled in on output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_name: Option<String>,
    /// Title of the referenced position, filled in on output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_name: Option<String>,
}
