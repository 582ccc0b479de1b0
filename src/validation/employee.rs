use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidateEmail;

use super::{Checker, ValidationErrors, rule};
use crate::models::EmployeeDto;

const MIN_PERSON_NAME_LEN: usize = 2;
const MAX_PERSON_NAME_LEN: usize = 50;

/// Salary column is `DECIMAL(6, 2)`.
const SALARY_SCALE: u32 = 2;
const SALARY_INTEGER_DIGITS: u32 = 4;

/// Lithuanian mobile/landline format: `+370` followed by eight digits.
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+370\d{8}$").expect("phone pattern is a valid regex"));

/// Validate an employee before create or update.
pub fn validate_employee(dto: &EmployeeDto) -> Result<(), ValidationErrors> {
    let mut checker = Checker::default();

    checker.text_length("first_name", &dto.first_name, MIN_PERSON_NAME_LEN, MAX_PERSON_NAME_LEN);
    checker.text_length("last_name", &dto.last_name, MIN_PERSON_NAME_LEN, MAX_PERSON_NAME_LEN);

    if dto.email.trim().is_empty() {
        checker.fail("email", rule::NOT_EMPTY, "email must not be empty");
    } else if !dto.email.validate_email() {
        checker.fail("email", rule::EMAIL, "email is not a valid email address");
    }

    if dto.phone_number.trim().is_empty() {
        checker.fail("phone_number", rule::NOT_EMPTY, "phone_number must not be empty");
    } else if !PHONE_PATTERN.is_match(&dto.phone_number) {
        checker.fail("phone_number", rule::PHONE_FORMAT, "Invalid phone number");
    }

    checker.non_zero("department_id", &dto.department_id);
    checker.non_zero("position_id", &dto.position_id);
    if dto.salary.is_zero() {
        checker.fail("salary", rule::NOT_ZERO, "salary must be set");
    } else if !fits_salary_column(dto.salary) {
        checker.fail(
            "salary",
            rule::PRECISION,
            format!("salary must be below {} with at most {SALARY_SCALE} decimal places", salary_limit()),
        );
    }

    checker.finish()
}

fn salary_limit() -> Decimal {
    Decimal::from(10u32.pow(SALARY_INTEGER_DIGITS))
}

fn fits_salary_column(salary: Decimal) -> bool {
    salary.normalize().scale() <= SALARY_SCALE && salary.abs() < salary_limit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn valid_employee() -> EmployeeDto {
        EmployeeDto {
            id: 1,
            first_name: "Name".to_string(),
            last_name: "LastName".to_string(),
            email: "email@email.com".to_string(),
            phone_number: "+37063444111".to_string(),
            department_id: 1,
            position_id: 1,
            salary: Decimal::new(5000, 0),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_employee() {
        assert!(validate_employee(&valid_employee()).is_ok());
    }

    #[test]
    fn test_bad_email_and_phone_give_two_errors() {
        let dto = EmployeeDto {
            email: "bad".to_string(),
            phone_number: "123".to_string(),
            ..valid_employee()
        };

        let errors = validate_employee(&dto).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.failures()[0].field, "email");
        assert_eq!(errors.failures()[0].rule, rule::EMAIL);
        assert_eq!(errors.failures()[1].field, "phone_number");
        assert_eq!(errors.failures()[1].rule, rule::PHONE_FORMAT);
    }

    #[test]
    fn test_phone_format() {
        for phone in ["+3706344411", "+370634441112", "37063444111", "+37163444111", "+370634a4111"] {
            let dto = EmployeeDto {
                phone_number: phone.to_string(),
                ..valid_employee()
            };
            assert!(validate_employee(&dto).is_err(), "{phone} should be rejected");
        }
    }

    #[test]
    fn test_salary_must_fit_column() {
        for salary in [Decimal::new(1_000_000, 0), Decimal::new(123_456_789_999, 3), Decimal::new(12_345, 3)] {
            let dto = EmployeeDto {
                salary,
                ..valid_employee()
            };
            let errors = validate_employee(&dto).unwrap_err();
            assert_eq!(errors.len(), 1, "{salary}");
            assert_eq!(errors.failures()[0].field, "salary");
            assert_eq!(errors.failures()[0].rule, rule::PRECISION);
        }

        for salary in [Decimal::new(999_999, 2), Decimal::new(12_500, 3), Decimal::new(-5000, 0)] {
            let dto = EmployeeDto {
                salary,
                ..valid_employee()
            };
            assert!(validate_employee(&dto).is_ok(), "{salary} should fit");
        }
    }

    #[test]
    fn test_name_length_bounds() {
        let short = EmployeeDto {
            first_name: "A".to_string(),
            ..valid_employee()
        };
        let errors = validate_employee(&short).unwrap_err();
        assert_eq!(errors.failures()[0].rule, rule::LENGTH);

        let long = EmployeeDto {
            last_name: "x".repeat(51),
            ..valid_employee()
        };
        assert!(validate_employee(&long).unwrap_err().has_field("last_name"));

        let edge = EmployeeDto {
            first_name: "Al".to_string(),
            last_name: "x".repeat(50),
            ..valid_employee()
        };
        assert!(validate_employee(&edge).is_ok());
    }

    #[test]
    fn test_missing_references_and_salary() {
        let dto = EmployeeDto {
            department_id: 0,
            position_id: 0,
            salary: Decimal::ZERO,
            ..valid_employee()
        };
        let errors = validate_employee(&dto).unwrap_err();
        let fields: Vec<_> = errors.failures().iter().map(|f| f.field).collect();
        assert_eq!(fields, ["department_id", "position_id", "salary"]);
        assert!(errors.failures().iter().all(|f| f.rule == rule::NOT_ZERO));
    }

    #[test]
    fn test_empty_dto_reports_every_field_once() {
        let errors = validate_employee(&EmployeeDto::default()).unwrap_err();
        assert_eq!(errors.len(), 7);
    }
}
