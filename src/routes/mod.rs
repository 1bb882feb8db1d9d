//! Rutas HTTP
//!
//! Todas las rutas `/api` pasan por el middleware JWT; `/health` es pública.

pub mod driver_routes;
pub mod location_routes;
pub mod ride_routes;
pub mod stop_routes;

use axum::{extract::State, middleware, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::middleware::{auth_middleware, cors_layer};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Router completo de la aplicación
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(driver_routes::create_driver_router())
        .merge(location_routes::create_location_router())
        .merge(stop_routes::create_stop_router())
        .merge(ride_routes::create_ride_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health_check))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.journal.ping().await?;
    Ok(Json(json!({
        "status": "healthy",
        "service": "ride-journal",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}
