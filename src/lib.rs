//! Diario de viajes de conductores
//!
//! Motor de consistencia del ciclo de vida de los viajes (conductores,
//! ubicaciones, paradas y viajes) y su transporte HTTP.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_router;
pub use services::JournalService;
pub use state::AppState;
pub use utils::errors::{AppError, AppResult};
