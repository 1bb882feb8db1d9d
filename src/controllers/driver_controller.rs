use std::sync::Arc;

use validator::Validate;

use crate::dto::driver_dto::{
    CreateDriverRequest, DriverResponse, StatisticsResponse, UpdateDriverRequest,
};
use crate::dto::ApiResponse;
use crate::models::AuthenticatedDriver;
use crate::services::JournalService;
use crate::utils::errors::AppError;

pub struct DriverController {
    journal: Arc<JournalService>,
}

impl DriverController {
    pub fn new(journal: Arc<JournalService>) -> Self {
        Self { journal }
    }

    pub async fn create(
        &self,
        caller: &AuthenticatedDriver,
        request: CreateDriverRequest,
    ) -> Result<ApiResponse<DriverResponse>, AppError> {
        request.validate()?;
        let driver = self
            .journal
            .create_driver(caller, &request.identifier, request.objective)
            .await?;
        Ok(ApiResponse::success_with_message(driver.into(), "Driver created"))
    }

    pub async fn get(
        &self,
        caller: &AuthenticatedDriver,
        identifier: &str,
    ) -> Result<DriverResponse, AppError> {
        Ok(self.journal.get_driver(caller, identifier).await?.into())
    }

    pub async fn list(
        &self,
        caller: &AuthenticatedDriver,
    ) -> Result<Vec<DriverResponse>, AppError> {
        let drivers = self.journal.list_drivers(caller).await?;
        Ok(drivers.into_iter().map(DriverResponse::from).collect())
    }

    pub async fn update(
        &self,
        caller: &AuthenticatedDriver,
        identifier: &str,
        request: UpdateDriverRequest,
    ) -> Result<ApiResponse<DriverResponse>, AppError> {
        request.validate()?;
        let driver = self
            .journal
            .update_driver(caller, identifier, request.objective)
            .await?;
        Ok(ApiResponse::success_with_message(driver.into(), "Driver updated"))
    }

    pub async fn delete(
        &self,
        caller: &AuthenticatedDriver,
        identifier: &str,
    ) -> Result<(), AppError> {
        self.journal.delete_driver(caller, identifier).await
    }

    pub async fn statistics(
        &self,
        caller: &AuthenticatedDriver,
        identifier: &str,
    ) -> Result<StatisticsResponse, AppError> {
        Ok(self.journal.driver_statistics(caller, identifier).await?.into())
    }
}
