//! Department endpoints.

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};

use super::AppState;
use super::extract::{JsonBody, PathParam};
use crate::error::AppError;
use crate::models::DepartmentDto;
use crate::services::DepartmentService;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/departments", get(list).post(create).put(update))
        .route("/v1/departments/{id}", get(get_by_id).delete(delete))
}

async fn create(
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<DepartmentDto>,
) -> Result<impl IntoResponse, AppError> {
    let uow = state.begin();
    let created = DepartmentService::new(uow.as_ref()).create(dto).await?;
    let location = format!("/v1/departments/{}", created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<DepartmentDto>>, AppError> {
    let uow = state.begin();
    Ok(Json(DepartmentService::new(uow.as_ref()).get_all().await?))
}

async fn get_by_id(State(state): State<AppState>, PathParam(id): PathParam<i32>) -> Result<Json<DepartmentDto>, AppError> {
    let uow = state.begin();
    Ok(Json(DepartmentService::new(uow.as_ref()).get_by_id(id).await?))
}

async fn update(State(state): State<AppState>, JsonBody(dto): JsonBody<DepartmentDto>) -> Result<StatusCode, AppError> {
    let uow = state.begin();
    DepartmentService::new(uow.as_ref()).update(dto).await?;
    Ok(StatusCode::OK)
}

async fn delete(State(state): State<AppState>, PathParam(id): PathParam<i32>) -> Result<StatusCode, AppError> {
    let uow = state.begin();
    DepartmentService::new(uow.as_ref()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
