use std::collections::HashMap;

use tracing::info;

use super::assigned_id;
use crate::db::UnitOfWork;
use crate::error::{AppError, Result};
use crate::mapper::{apply_position_update, position_from_dto, position_to_dto};
use crate::models::PositionDto;
use crate::validation::validate_position;

const ENTITY: &str = "Position";

/// Position operations within one unit of work.
pub struct PositionService<'a> {
    uow: &'a dyn UnitOfWork,
}

impl<'a> PositionService<'a> {
    pub fn new(uow: &'a dyn UnitOfWork) -> Self {
        Self { uow }
    }

    pub async fn create(&self, dto: PositionDto) -> Result<PositionDto> {
        validate_position(&dto)?;

        let mut model = position_from_dto(&dto);
        let staged = self.uow.positions().add(model.clone());
        self.uow.commit().await?;

        model.id = assigned_id(&staged, ENTITY)?;
        info!("Position {} (id {}) was created", model.title, model.id);
        Ok(position_to_dto(model, 0))
    }

    pub async fn get_all(&self) -> Result<Vec<PositionDto>> {
        let positions = self.uow.positions().get_all().await?;
        let employees = self.uow.employees().get_all().await?;

        let mut headcount: HashMap<i32, u64> = HashMap::new();
        for employee in &employees {
            *headcount.entry(employee.position_id).or_default() += 1;
        }

        info!("List of {} positions was returned", positions.len());
        Ok(positions
            .into_iter()
            .map(|p| {
                let count = headcount.get(&p.id).copied().unwrap_or(0);
                position_to_dto(p, count)
            })
            .collect())
    }

    pub async fn get_by_id(&self, id: i32) -> Result<PositionDto> {
        info!("Position with id {id} was requested");
        let model = self
            .uow
            .positions()
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(ENTITY, id))?;

        let count = self.uow.employees().count_by_position(id).await?;
        Ok(position_to_dto(model, count))
    }

    pub async fn update(&self, dto: PositionDto) -> Result<()> {
        let mut model = self
            .uow
            .positions()
            .get_by_id(dto.id)
            .await?
            .ok_or_else(|| AppError::not_found(ENTITY, dto.id))?;

        validate_position(&dto)?;

        apply_position_update(&mut model, &dto);
        let (id, title) = (model.id, model.title.clone());
        self.uow.positions().update(model);
        self.uow.commit().await?;
        info!("Information of position {title} (id {id}) was updated");
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let model = self
            .uow
            .positions()
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(ENTITY, id))?;

        self.uow.positions().delete(model);
        self.uow.commit().await?;
        info!("Position with id {id} was deleted");
        Ok(())
    }
}
