use std::sync::Arc;

use validator::Validate;

use crate::dto::location_dto::{LocationRequest, LocationResponse};
use crate::dto::ApiResponse;
use crate::models::{AuthenticatedDriver, LocationId};
use crate::services::JournalService;
use crate::utils::errors::AppError;

pub struct LocationController {
    journal: Arc<JournalService>,
}

impl LocationController {
    pub fn new(journal: Arc<JournalService>) -> Self {
        Self { journal }
    }

    pub async fn create(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        request: LocationRequest,
    ) -> Result<ApiResponse<LocationResponse>, AppError> {
        request.validate()?;
        let location = self
            .journal
            .create_location(caller, driver_id, request.into())
            .await?;
        Ok(ApiResponse::success_with_message(location.into(), "Location created"))
    }

    pub async fn get(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        id: LocationId,
    ) -> Result<LocationResponse, AppError> {
        Ok(self.journal.get_location(caller, driver_id, id).await?.into())
    }

    pub async fn list(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
    ) -> Result<Vec<LocationResponse>, AppError> {
        let locations = self.journal.list_locations(caller, driver_id).await?;
        Ok(locations.into_iter().map(LocationResponse::from).collect())
    }

    pub async fn update(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        id: LocationId,
        request: LocationRequest,
    ) -> Result<ApiResponse<LocationResponse>, AppError> {
        request.validate()?;
        let location = self
            .journal
            .update_location(caller, driver_id, id, request.into())
            .await?;
        Ok(ApiResponse::success_with_message(location.into(), "Location updated"))
    }

    pub async fn delete(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        id: LocationId,
    ) -> Result<(), AppError> {
        self.journal.delete_location(caller, driver_id, id).await
    }
}
