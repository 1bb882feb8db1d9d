use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};

use crate::controllers::LocationController;
use crate::dto::location_dto::{LocationRequest, LocationResponse};
use crate::dto::ApiResponse;
use crate::models::{AuthenticatedDriver, LocationId};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_location_router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/drivers/:driver_id/locations",
            get(list_locations).post(create_location),
        )
        .route(
            "/api/drivers/:driver_id/locations/:location_id",
            get(get_location).put(update_location).delete(delete_location),
        )
}

async fn create_location(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedDriver>,
    Path(driver_id): Path<String>,
    Json(request): Json<LocationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LocationResponse>>), AppError> {
    let controller = LocationController::new(state.journal.clone());
    let response = controller.create(&caller, &driver_id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_locations(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedDriver>,
    Path(driver_id): Path<String>,
) -> Result<Json<Vec<LocationResponse>>, AppError> {
    let controller = LocationController::new(state.journal.clone());
    Ok(Json(controller.list(&caller, &driver_id).await?))
}

async fn get_location(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedDriver>,
    Path((driver_id, location_id)): Path<(String, LocationId)>,
) -> Result<Json<LocationResponse>, AppError> {
    let controller = LocationController::new(state.journal.clone());
    Ok(Json(controller.get(&caller, &driver_id, location_id).await?))
}

async fn update_location(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedDriver>,
    Path((driver_id, location_id)): Path<(String, LocationId)>,
    Json(request): Json<LocationRequest>,
) -> Result<Json<ApiResponse<LocationResponse>>, AppError> {
    let controller = LocationController::new(state.journal.clone());
    Ok(Json(
        controller
            .update(&caller, &driver_id, location_id, request)
            .await?,
    ))
}

async fn delete_location(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedDriver>,
    Path((driver_id, location_id)): Path<(String, LocationId)>,
) -> Result<StatusCode, AppError> {
    let controller = LocationController::new(state.journal.clone());
    controller.delete(&caller, &driver_id, location_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
