use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Driver, DriverStatistics};

// Request para crear un conductor
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDriverRequest {
    #[validate(length(min = 1, max = 64))]
    pub identifier: String,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub objective: i64,
}

// Request para actualizar el objetivo de un conductor
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDriverRequest {
    #[validate(range(min = 0))]
    pub objective: i64,
}

// Response de conductor
#[derive(Debug, Serialize)]
pub struct DriverResponse {
    pub identifier: String,
    pub objective: i64,
}

impl From<Driver> for DriverResponse {
    fn from(driver: Driver) -> Self {
        Self {
            identifier: driver.identifier,
            objective: driver.objective,
        }
    }
}

// Response de estadísticas
#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub rides: u64,
    pub locations: u64,
    pub total_distance: i64,
    pub objective: i64,
    pub objective_reached: bool,
}

impl From<DriverStatistics> for StatisticsResponse {
    fn from(stats: DriverStatistics) -> Self {
        Self {
            rides: stats.rides,
            locations: stats.locations,
            total_distance: stats.total_distance,
            objective: stats.objective,
            objective_reached: stats.objective_reached,
        }
    }
}
