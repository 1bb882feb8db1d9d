use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{LocationId, Stop, StopId, StopInput};

// Request de parada: salida, llegada o parada suelta
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StopRequest {
    pub moment: NaiveDateTime,
    pub location_id: LocationId,
    #[validate(range(min = 0))]
    pub odometer_value: i64,
}

impl From<StopRequest> for StopInput {
    fn from(request: StopRequest) -> Self {
        Self {
            moment: request.moment,
            location_id: request.location_id,
            odometer_value: request.odometer_value,
        }
    }
}

// Response de parada
#[derive(Debug, Serialize)]
pub struct StopResponse {
    pub id: StopId,
    pub moment: NaiveDateTime,
    pub location_id: LocationId,
    pub odometer_value: i64,
}

impl From<Stop> for StopResponse {
    fn from(stop: Stop) -> Self {
        Self {
            id: stop.id,
            moment: stop.moment,
            location_id: stop.location_id,
            odometer_value: stop.odometer_value,
        }
    }
}
