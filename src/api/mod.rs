//! HTTP surface: one router per resource under `/v1`.

mod departments;
mod employees;
pub mod error;
mod extract;
mod positions;

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::db::{UnitOfWork, UnitOfWorkFactory};

/// Shared handler state. Each request begins its own unit of work.
#[derive(Clone)]
pub struct AppState {
    units: Arc<dyn UnitOfWorkFactory>,
}

impl AppState {
    pub fn new(units: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { units }
    }

    pub fn begin(&self) -> Box<dyn UnitOfWork> {
        self.units.begin()
    }
}

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(departments::router())
        .merge(positions::router())
        .merge(employees::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
