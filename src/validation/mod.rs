//! Field-level validation of incoming DTOs.
//!
//! Validators are pure: they look only at the DTO and never touch the store.
//! Each field reports at most one failure, the first rule it breaks, and
//! failures are listed in the DTO's field order.

mod department;
mod employee;
mod position;

pub use department::validate_department;
pub use employee::validate_employee;
pub use position::validate_position;

use serde::Serialize;
use std::fmt;

/// Maximum length of department names and position titles.
pub const MAX_NAME_LEN: usize = 80;

/// Maximum length of department and position descriptions.
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Rule identifiers reported in [`ValidationFailure::rule`].
pub mod rule {
    pub const NOT_EMPTY: &str = "not_empty";
    pub const MAX_LENGTH: &str = "max_length";
    pub const LENGTH: &str = "length";
    pub const EMAIL: &str = "email";
    pub const PHONE_FORMAT: &str = "phone_format";
    pub const NOT_ZERO: &str = "not_zero";
    pub const PRECISION: &str = "precision";
    pub const MALFORMED: &str = "malformed";
}

/// A single violated rule on a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub field: &'static str,
    pub rule: &'static str,
    pub message: String,
}

/// Non-empty, ordered list of validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<ValidationFailure>);

impl ValidationErrors {
    /// A list holding exactly one failure.
    pub fn single(field: &'static str, rule: &'static str, message: impl Into<String>) -> Self {
        Self(vec![ValidationFailure {
            field,
            rule,
            message: message.into(),
        }])
    }

    pub fn failures(&self) -> &[ValidationFailure] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any failure was reported for `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|f| f.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.iter().map(|failure| failure.field).collect();
        write!(f, "{} invalid field(s): {}", self.0.len(), fields.join(", "))
    }
}

/// Collects failures while a validator walks the DTO.
#[derive(Debug, Default)]
pub(crate) struct Checker {
    failures: Vec<ValidationFailure>,
}

impl Checker {
    pub(crate) fn fail(&mut self, field: &'static str, rule: &'static str, message: impl Into<String>) {
        self.failures.push(ValidationFailure {
            field,
            rule,
            message: message.into(),
        });
    }

    /// Required text no longer than `max_len` characters.
    pub(crate) fn bounded_text(&mut self, field: &'static str, value: &str, max_len: usize) {
        if value.trim().is_empty() {
            self.fail(field, rule::NOT_EMPTY, format!("{field} must not be empty"));
            return;
        }
        let len = value.chars().count();
        if len > max_len {
            self.fail(
                field,
                rule::MAX_LENGTH,
                format!("{field} is too long ({len} chars, max {max_len})"),
            );
        }
    }

    /// Required text between `min_len` and `max_len` characters inclusive.
    pub(crate) fn text_length(&mut self, field: &'static str, value: &str, min_len: usize, max_len: usize) {
        if value.trim().is_empty() {
            self.fail(field, rule::NOT_EMPTY, format!("{field} must not be empty"));
            return;
        }
        let len = value.chars().count();
        if len < min_len || len > max_len {
            self.fail(
                field,
                rule::LENGTH,
                format!("{field} must be between {min_len} and {max_len} characters ({len} given)"),
            );
        }
    }

    pub(crate) fn non_zero<T: Default + PartialEq>(&mut self, field: &'static str, value: &T) {
        if *value == T::default() {
            self.fail(field, rule::NOT_ZERO, format!("{field} must be set"));
        }
    }

    pub(crate) fn finish(self) -> Result<(), ValidationErrors> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.failures))
        }
    }
}
