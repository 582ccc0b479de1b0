pub mod api;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod mapper;
pub mod models;
pub mod services;
pub mod validation;

pub use error::{AppError, Result};
