use std::sync::Arc;

use validator::Validate;

use crate::dto::stop_dto::{StopRequest, StopResponse};
use crate::dto::ApiResponse;
use crate::models::{AuthenticatedDriver, StopId};
use crate::services::JournalService;
use crate::utils::errors::AppError;

pub struct StopController {
    journal: Arc<JournalService>,
}

impl StopController {
    pub fn new(journal: Arc<JournalService>) -> Self {
        Self { journal }
    }

    pub async fn create(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        request: StopRequest,
    ) -> Result<ApiResponse<StopResponse>, AppError> {
        request.validate()?;
        let stop = self.journal.create_stop(caller, driver_id, request.into()).await?;
        Ok(ApiResponse::success_with_message(stop.into(), "Stop created"))
    }

    pub async fn get(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        id: StopId,
    ) -> Result<StopResponse, AppError> {
        Ok(self.journal.get_stop(caller, driver_id, id).await?.into())
    }

    pub async fn list(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
    ) -> Result<Vec<StopResponse>, AppError> {
        let stops = self.journal.list_stops(caller, driver_id).await?;
        Ok(stops.into_iter().map(StopResponse::from).collect())
    }

    pub async fn delete(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        id: StopId,
    ) -> Result<(), AppError> {
        self.journal.delete_stop(caller, driver_id, id).await
    }
}
