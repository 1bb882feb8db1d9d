use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};

use crate::controllers::DriverController;
use crate::dto::driver_dto::{
    CreateDriverRequest, DriverResponse, StatisticsResponse, UpdateDriverRequest,
};
use crate::dto::ApiResponse;
use crate::models::AuthenticatedDriver;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/api/drivers", get(list_drivers).post(create_driver))
        .route(
            "/api/drivers/:driver_id",
            get(get_driver).put(update_driver).delete(delete_driver),
        )
        .route("/api/drivers/:driver_id/statistics", get(get_statistics))
}

async fn create_driver(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedDriver>,
    Json(request): Json<CreateDriverRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DriverResponse>>), AppError> {
    let controller = DriverController::new(state.journal.clone());
    let response = controller.create(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_drivers(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedDriver>,
) -> Result<Json<Vec<DriverResponse>>, AppError> {
    let controller = DriverController::new(state.journal.clone());
    Ok(Json(controller.list(&caller).await?))
}

async fn get_driver(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedDriver>,
    Path(driver_id): Path<String>,
) -> Result<Json<DriverResponse>, AppError> {
    let controller = DriverController::new(state.journal.clone());
    Ok(Json(controller.get(&caller, &driver_id).await?))
}

async fn update_driver(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedDriver>,
    Path(driver_id): Path<String>,
    Json(request): Json<UpdateDriverRequest>,
) -> Result<Json<ApiResponse<DriverResponse>>, AppError> {
    let controller = DriverController::new(state.journal.clone());
    Ok(Json(controller.update(&caller, &driver_id, request).await?))
}

async fn delete_driver(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedDriver>,
    Path(driver_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let controller = DriverController::new(state.journal.clone());
    controller.delete(&caller, &driver_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_statistics(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedDriver>,
    Path(driver_id): Path<String>,
) -> Result<Json<StatisticsResponse>, AppError> {
    let controller = DriverController::new(state.journal.clone());
    Ok(Json(controller.statistics(&caller, &driver_id).await?))
}
