use std::collections::HashMap;

use tracing::info;

use super::assigned_id;
use crate::db::UnitOfWork;
use crate::error::{AppError, Result};
use crate::mapper::{apply_department_update, department_from_dto, department_to_dto};
use crate::models::DepartmentDto;
use crate::validation::validate_department;

const ENTITY: &str = "Department";

/// Department operations within one unit of work.
pub struct DepartmentService<'a> {
    uow: &'a dyn UnitOfWork,
}

impl<'a> DepartmentService<'a> {
    pub fn new(uow: &'a dyn UnitOfWork) -> Self {
        Self { uow }
    }

    /// Validate and persist a new department. Returns it with its new id.
    pub async fn create(&self, dto: DepartmentDto) -> Result<DepartmentDto> {
        validate_department(&dto)?;

        let mut model = department_from_dto(&dto);
        let staged = self.uow.departments().add(model.clone());
        self.uow.commit().await?;

        model.id = assigned_id(&staged, ENTITY)?;
        info!("Department {} (id {}) was created", model.name, model.id);
        Ok(department_to_dto(model, 0))
    }

    pub async fn get_all(&self) -> Result<Vec<DepartmentDto>> {
        let departments = self.uow.departments().get_all().await?;
        let employees = self.uow.employees().get_all().await?;

        let mut headcount: HashMap<i32, u64> = HashMap::new();
        for employee in &employees {
            *headcount.entry(employee.department_id).or_default() += 1;
        }

        info!("List of {} departments was returned", departments.len());
        Ok(departments
            .into_iter()
            .map(|d| {
                let count = headcount.get(&d.id).copied().unwrap_or(0);
                department_to_dto(d, count)
            })
            .collect())
    }

    pub async fn get_by_id(&self, id: i32) -> Result<DepartmentDto> {
        info!("Department with id {id} was requested");
        let Some(model) = self.uow.departments().get_by_id(id).await? else {
            info!("Department with id {id} was not found");
            return Err(AppError::not_found(ENTITY, id));
        };

        let count = self.uow.employees().count_by_department(id).await?;
        Ok(department_to_dto(model, count))
    }

    /// Overwrite name and description of an existing department.
    pub async fn update(&self, dto: DepartmentDto) -> Result<()> {
        let Some(mut model) = self.uow.departments().get_by_id(dto.id).await? else {
            info!("Department with id {} was not found", dto.id);
            return Err(AppError::not_found(ENTITY, dto.id));
        };

        validate_department(&dto)?;

        apply_department_update(&mut model, &dto);
        let (id, name) = (model.id, model.name.clone());
        self.uow.departments().update(model);
        self.uow.commit().await?;
        info!("Information of department {name} (id {id}) was updated");
        Ok(())
    }

    /// Remove a department. Fails at commit while employees still reference it.
    pub async fn delete(&self, id: i32) -> Result<()> {
        let Some(model) = self.uow.departments().get_by_id(id).await? else {
            info!("Department with id {id} was not found");
            return Err(AppError::not_found(ENTITY, id));
        };

        self.uow.departments().delete(model);
        self.uow.commit().await?;
        info!("Department with id {id} was deleted");
        Ok(())
    }
}
