//! Mapping of application errors to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::error::AppError;
use crate::validation::ValidationFailure;

/// Body returned for 500 responses; details stay in the logs.
pub const GENERIC_FAILURE: &str = "An error occurred.";

#[derive(Serialize)]
struct ValidationBody<'a> {
    errors: &'a [ValidationFailure],
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(ValidationBody {
                    errors: errors.failures(),
                }),
            )
                .into_response(),
            AppError::NotFound { entity, id } => (
                StatusCode::NOT_FOUND,
                Json(ErrorBody {
                    error: format!("{entity} {id} not found"),
                }),
            )
                .into_response(),
            _ => {
                error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error: GENERIC_FAILURE.to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}
