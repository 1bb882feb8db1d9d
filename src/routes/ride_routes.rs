use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::RideController;
use crate::dto::ride_dto::{
    CompleteRideRequest, RideListQuery, RideResponse, StartRideRequest, UpdateRideRequest,
};
use crate::dto::ApiResponse;
use crate::models::{AuthenticatedDriver, RideId};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_ride_router() -> Router<AppState> {
    Router::new()
        .route("/api/drivers/:driver_id/rides", get(list_rides).post(start_ride))
        .route(
            "/api/drivers/:driver_id/rides/:ride_id",
            get(get_ride).put(update_ride).delete(delete_ride),
        )
        .route(
            "/api/drivers/:driver_id/rides/:ride_id/complete",
            post(complete_ride),
        )
}

async fn start_ride(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedDriver>,
    Path(driver_id): Path<String>,
    Json(request): Json<StartRideRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RideResponse>>), AppError> {
    let controller = RideController::new(state.journal.clone());
    let response = controller.start(&caller, &driver_id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn complete_ride(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedDriver>,
    Path((driver_id, ride_id)): Path<(String, RideId)>,
    Json(request): Json<CompleteRideRequest>,
) -> Result<Json<ApiResponse<RideResponse>>, AppError> {
    let controller = RideController::new(state.journal.clone());
    Ok(Json(
        controller
            .complete(&caller, &driver_id, ride_id, request)
            .await?,
    ))
}

async fn update_ride(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedDriver>,
    Path((driver_id, ride_id)): Path<(String, RideId)>,
    Json(request): Json<UpdateRideRequest>,
) -> Result<Json<ApiResponse<RideResponse>>, AppError> {
    let controller = RideController::new(state.journal.clone());
    Ok(Json(
        controller
            .update(&caller, &driver_id, ride_id, request)
            .await?,
    ))
}

async fn list_rides(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedDriver>,
    Path(driver_id): Path<String>,
    Query(query): Query<RideListQuery>,
) -> Result<Json<Vec<RideResponse>>, AppError> {
    let controller = RideController::new(state.journal.clone());
    Ok(Json(controller.list(&caller, &driver_id, query.last).await?))
}

async fn get_ride(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedDriver>,
    Path((driver_id, ride_id)): Path<(String, RideId)>,
) -> Result<Json<RideResponse>, AppError> {
    let controller = RideController::new(state.journal.clone());
    Ok(Json(controller.get(&caller, &driver_id, ride_id).await?))
}

async fn delete_ride(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedDriver>,
    Path((driver_id, ride_id)): Path<(String, RideId)>,
) -> Result<StatusCode, AppError> {
    let controller = RideController::new(state.journal.clone());
    controller.delete(&caller, &driver_id, ride_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
