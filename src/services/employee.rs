use std::collections::HashMap;

use tracing::info;

use super::assigned_id;
use crate::db::UnitOfWork;
use crate::entities::employee;
use crate::error::{AppError, Result};
use crate::mapper::{apply_employee_update, employee_from_dto, employee_to_dto, today};
use crate::models::EmployeeDto;
use crate::validation::validate_employee;

const ENTITY: &str = "Employee";

/// Employee operations within one unit of work.
pub struct EmployeeService<'a> {
    uow: &'a dyn UnitOfWork,
}

impl<'a> EmployeeService<'a> {
    pub fn new(uow: &'a dyn UnitOfWork) -> Self {
        Self { uow }
    }

    /// Validate and persist a new employee.
    ///
    /// The department and position must exist; the store rejects the commit
    /// otherwise.
    pub async fn create(&self, dto: EmployeeDto) -> Result<EmployeeDto> {
        validate_employee(&dto)?;

        let mut model = employee_from_dto(&dto, today());
        let staged = self.uow.employees().add(model.clone());
        self.uow.commit().await?;

        model.id = assigned_id(&staged, ENTITY)?;
        info!(
            "Employee {} {} (id {}) was created",
            model.first_name, model.last_name, model.id
        );
        self.to_dto(model).await
    }

    pub async fn get_all(&self) -> Result<Vec<EmployeeDto>> {
        let employees = self.uow.employees().get_all().await?;
        let departments: HashMap<_, _> = self
            .uow
            .departments()
            .get_all()
            .await?
            .into_iter()
            .map(|d| (d.id, d))
            .collect();
        let positions: HashMap<_, _> = self
            .uow
            .positions()
            .get_all()
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        info!("List of {} employees was returned", employees.len());
        Ok(employees
            .into_iter()
            .map(|e| {
                let department = departments.get(&e.department_id);
                let position = positions.get(&e.position_id);
                employee_to_dto(e, department, position)
            })
            .collect())
    }

    pub async fn get_by_id(&self, id: i32) -> Result<EmployeeDto> {
        info!("Employee with id {id} was requested");
        let Some(model) = self.uow.employees().get_by_id(id).await? else {
            info!("Employee with id {id} was not found");
            return Err(AppError::not_found(ENTITY, id));
        };
        self.to_dto(model).await
    }

    /// Overwrite the mutable fields of an existing employee.
    ///
    /// The hire date is never changed.
    pub async fn update(&self, dto: EmployeeDto) -> Result<()> {
        let Some(mut model) = self.uow.employees().get_by_id(dto.id).await? else {
            info!("Employee with id {} was not found", dto.id);
            return Err(AppError::not_found(ENTITY, dto.id));
        };

        validate_employee(&dto)?;

        apply_employee_update(&mut model, &dto);
        let summary = format!("{} {} (id {})", model.first_name, model.last_name, model.id);
        self.uow.employees().update(model);
        self.uow.commit().await?;
        info!("Information of employee {summary} was updated");
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let Some(model) = self.uow.employees().get_by_id(id).await? else {
            info!("Employee with id {id} was not found");
            return Err(AppError::not_found(ENTITY, id));
        };

        self.uow.employees().delete(model);
        self.uow.commit().await?;
        info!("Employee with id {id} was deleted");
        Ok(())
    }

    /// Resolve department and position names for one employee.
    async fn to_dto(&self, model: employee::Model) -> Result<EmployeeDto> {
        let department = self.uow.departments().get_by_id(model.department_id).await?;
        let position = self.uow.positions().get_by_id(model.position_id).await?;
        Ok(employee_to_dto(model, department.as_ref(), position.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CommitRecord, MemoryStore};
    use crate::entities::{department, position};
    use crate::services::log_capture::CapturedLogs;
    use crate::validation::rule;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    struct Fixture {
        store: MemoryStore,
        department: department::Model,
        position: position::Model,
    }

    fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let department = store.seed(department::Model {
            id: 0,
            name: "IT".to_string(),
            description: "Computers".to_string(),
        });
        let position = store.seed(position::Model {
            id: 0,
            title: "Developer".to_string(),
            description: "Writes code".to_string(),
        });
        Fixture {
            store,
            department,
            position,
        }
    }

    fn valid_dto(fx: &Fixture) -> EmployeeDto {
        EmployeeDto {
            id: 1,
            first_name: "Name".to_string(),
            last_name: "LastName".to_string(),
            email: "email@email.com".to_string(),
            phone_number: "+37063444111".to_string(),
            department_id: fx.department.id,
            position_id: fx.position.id,
            salary: Decimal::new(5000, 0),
            ..Default::default()
        }
    }

    fn stored_employee(fx: &Fixture) -> employee::Model {
        fx.store.seed(employee::Model {
            id: 0,
            first_name: "ExistingFirstName".to_string(),
            last_name: "ExistingLastName".to_string(),
            email: "email@email.com".to_string(),
            phone_number: "+37063555666".to_string(),
            department_id: fx.department.id,
            position_id: fx.position.id,
            salary: Decimal::new(4000, 0),
            hire_date: NaiveDate::from_ymd_opt(2020, 2, 3).unwrap(),
        })
    }

    #[tokio::test]
    async fn test_create_valid_employee() {
        let fx = fixture();
        let uow = fx.store.unit_of_work();

        let created = EmployeeService::new(&uow).create(valid_dto(&fx)).await.unwrap();

        assert_eq!(uow.commit_count(), 1);
        assert_eq!(fx.store.history(), [CommitRecord { inserted: 1, updated: 0, deleted: 0 }]);
        assert_eq!(created.department_name.as_deref(), Some("IT"));
        assert_eq!(created.position_name.as_deref(), Some("Developer"));
        assert!(created.hire_date.is_some());
    }

    #[tokio::test]
    async fn test_create_with_bad_email_and_phone() {
        let fx = fixture();
        let uow = fx.store.unit_of_work();
        let dto = EmployeeDto {
            email: "bad".to_string(),
            phone_number: "123".to_string(),
            ..valid_dto(&fx)
        };

        let err = EmployeeService::new(&uow).create(dto).await.unwrap_err();

        let errors = match err {
            AppError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.failures()[0].rule, rule::EMAIL);
        assert_eq!(errors.failures()[1].rule, rule::PHONE_FORMAT);
        assert_eq!(uow.pending(), 0);
        assert_eq!(uow.commit_count(), 0);
        assert!(fx.store.rows::<employee::Model>().is_empty());
    }

    #[tokio::test]
    async fn test_create_with_unknown_department_fails_at_commit() {
        let fx = fixture();
        let uow = fx.store.unit_of_work();
        let dto = EmployeeDto {
            department_id: 404,
            ..valid_dto(&fx)
        };

        let err = EmployeeService::new(&uow).create(dto).await.unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));
        assert!(fx.store.rows::<employee::Model>().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_employee() {
        let fx = fixture();
        let uow = fx.store.unit_of_work();
        let dto = EmployeeDto {
            id: 999,
            ..valid_dto(&fx)
        };

        let err = EmployeeService::new(&uow).update(dto).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { entity: "Employee", id: 999 }));
        assert_eq!(uow.pending(), 0);
        assert_eq!(uow.commit_count(), 0);
    }

    #[tokio::test]
    async fn test_update_overwrites_mutable_fields_only() {
        let fx = fixture();
        let existing = stored_employee(&fx);
        let uow = fx.store.unit_of_work();

        let dto = EmployeeDto {
            id: existing.id,
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            phone_number: "+37063444123".to_string(),
            hire_date: NaiveDate::from_ymd_opt(2026, 1, 1),
            ..valid_dto(&fx)
        };
        EmployeeService::new(&uow).update(dto).await.unwrap();

        let stored = &fx.store.rows::<employee::Model>()[0];
        assert_eq!(stored.id, existing.id);
        assert_eq!(stored.first_name, "John");
        assert_eq!(stored.last_name, "Doe");
        assert_eq!(stored.phone_number, "+37063444123");
        assert_eq!(stored.salary, Decimal::new(5000, 0));
        assert_eq!(stored.hire_date, existing.hire_date);
        assert_eq!(fx.store.history(), [CommitRecord { inserted: 0, updated: 1, deleted: 0 }]);
    }

    #[tokio::test]
    async fn test_update_invalid_employee_commits_nothing() {
        let fx = fixture();
        let existing = stored_employee(&fx);
        let uow = fx.store.unit_of_work();

        let dto = EmployeeDto {
            id: existing.id,
            first_name: String::new(),
            ..valid_dto(&fx)
        };
        let err = EmployeeService::new(&uow).update(dto).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(uow.commit_count(), 0);
        assert_eq!(fx.store.rows::<employee::Model>(), [existing]);
    }

    #[tokio::test]
    async fn test_update_logged_only_after_commit() {
        let fx = fixture();
        let existing = stored_employee(&fx);
        let (logs, _guard) = CapturedLogs::install();

        let uow = fx.store.unit_of_work();
        let dangling = EmployeeDto {
            id: existing.id,
            department_id: 404,
            ..valid_dto(&fx)
        };
        let err = EmployeeService::new(&uow).update(dangling).await.unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));
        assert!(!logs.contains("was updated"));
        assert_eq!(fx.store.rows::<employee::Model>(), [existing.clone()]);

        let uow = fx.store.unit_of_work();
        let dto = EmployeeDto {
            id: existing.id,
            ..valid_dto(&fx)
        };
        EmployeeService::new(&uow).update(dto).await.unwrap();
        assert!(logs.contains("was updated"));
    }

    #[tokio::test]
    async fn test_get_all_resolves_names() {
        let fx = fixture();
        stored_employee(&fx);
        stored_employee(&fx);
        let uow = fx.store.unit_of_work();

        let all = EmployeeService::new(&uow).get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|e| e.department_name.as_deref() == Some("IT")));
        assert!(all.iter().all(|e| e.position_name.as_deref() == Some("Developer")));
    }

    #[tokio::test]
    async fn test_delete_existing_employee() {
        let fx = fixture();
        let existing = stored_employee(&fx);
        let uow = fx.store.unit_of_work();

        EmployeeService::new(&uow).delete(existing.id).await.unwrap();

        assert_eq!(uow.commit_count(), 1);
        assert!(fx.store.rows::<employee::Model>().is_empty());
    }

    #[tokio::test]
    async fn test_get_by_id_missing_employee() {
        let fx = fixture();
        let uow = fx.store.unit_of_work();

        let err = EmployeeService::new(&uow).get_by_id(999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }
}
