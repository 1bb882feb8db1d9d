use std::sync::Arc;

use validator::Validate;

use crate::dto::ride_dto::{CompleteRideRequest, RideResponse, StartRideRequest, UpdateRideRequest};
use crate::dto::ApiResponse;
use crate::models::{AuthenticatedDriver, RideId};
use crate::services::JournalService;
use crate::utils::errors::AppError;

pub struct RideController {
    journal: Arc<JournalService>,
}

impl RideController {
    pub fn new(journal: Arc<JournalService>) -> Self {
        Self { journal }
    }

    pub async fn start(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        request: StartRideRequest,
    ) -> Result<ApiResponse<RideResponse>, AppError> {
        request.validate()?;
        let ride = self
            .journal
            .start_ride(caller, driver_id, request.departure.into())
            .await?;
        Ok(ApiResponse::success_with_message(ride.into(), "Ride started"))
    }

    pub async fn complete(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        ride_id: RideId,
        request: CompleteRideRequest,
    ) -> Result<ApiResponse<RideResponse>, AppError> {
        request.validate()?;
        let ride = self
            .journal
            .complete_ride(caller, driver_id, ride_id, request.into())
            .await?;
        Ok(ApiResponse::success_with_message(ride.into(), "Ride completed"))
    }

    pub async fn update(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        ride_id: RideId,
        request: UpdateRideRequest,
    ) -> Result<ApiResponse<RideResponse>, AppError> {
        request.validate()?;
        let ride = self
            .journal
            .update_ride(caller, driver_id, ride_id, request.into())
            .await?;
        Ok(ApiResponse::success_with_message(ride.into(), "Ride updated"))
    }

    pub async fn get(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        ride_id: RideId,
    ) -> Result<RideResponse, AppError> {
        Ok(self.journal.get_ride(caller, driver_id, ride_id).await?.into())
    }

    pub async fn list(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        last_only: bool,
    ) -> Result<Vec<RideResponse>, AppError> {
        let rides = self.journal.list_rides(caller, driver_id, last_only).await?;
        Ok(rides.into_iter().map(RideResponse::from).collect())
    }

    pub async fn delete(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        ride_id: RideId,
    ) -> Result<(), AppError> {
        self.journal.delete_ride(caller, driver_id, ride_id).await
    }
}
