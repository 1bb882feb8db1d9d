use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};

use crate::controllers::StopController;
use crate::dto::stop_dto::{StopRequest, StopResponse};
use crate::dto::ApiResponse;
use crate::models::{AuthenticatedDriver, StopId};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_stop_router() -> Router<AppState> {
    Router::new()
        .route("/api/drivers/:driver_id/stops", get(list_stops).post(create_stop))
        .route(
            "/api/drivers/:driver_id/stops/:stop_id",
            get(get_stop).delete(delete_stop),
        )
}

async fn create_stop(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedDriver>,
    Path(driver_id): Path<String>,
    Json(request): Json<StopRequest>,
) -> Result<(StatusCode, Json<ApiResponse<StopResponse>>), AppError> {
    let controller = StopController::new(state.journal.clone());
    let response = controller.create(&caller, &driver_id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_stops(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedDriver>,
    Path(driver_id): Path<String>,
) -> Result<Json<Vec<StopResponse>>, AppError> {
    let controller = StopController::new(state.journal.clone());
    Ok(Json(controller.list(&caller, &driver_id).await?))
}

async fn get_stop(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedDriver>,
    Path((driver_id, stop_id)): Path<(String, StopId)>,
) -> Result<Json<StopResponse>, AppError> {
    let controller = StopController::new(state.journal.clone());
    Ok(Json(controller.get(&caller, &driver_id, stop_id).await?))
}

async fn delete_stop(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedDriver>,
    Path((driver_id, stop_id)): Path<(String, StopId)>,
) -> Result<StatusCode, AppError> {
    let controller = StopController::new(state.journal.clone());
    controller.delete(&caller, &driver_id, stop_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
