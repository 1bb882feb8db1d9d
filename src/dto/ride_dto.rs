use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Ride, RideId, StopId, TrafficCondition};
use crate::services::{Arrival, RideUpdate};

use super::stop_dto::{StopRequest, StopResponse};

// Request para iniciar un viaje
#[derive(Debug, Deserialize, Validate)]
pub struct StartRideRequest {
    #[validate]
    pub departure: StopRequest,
}

// Request para terminar un viaje
#[derive(Debug, Deserialize, Validate)]
pub struct CompleteRideRequest {
    #[validate]
    pub arrival: StopRequest,
    #[serde(default)]
    pub traffic_condition: TrafficCondition,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

impl From<CompleteRideRequest> for Arrival {
    fn from(request: CompleteRideRequest) -> Self {
        Self {
            stop: request.arrival.into(),
            traffic_condition: request.traffic_condition,
            comment: request.comment,
        }
    }
}

// Request para reemplazar un viaje a partir de paradas existentes
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRideRequest {
    pub departure_id: StopId,
    pub arrival_id: Option<StopId>,
    #[serde(default)]
    pub traffic_condition: TrafficCondition,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

impl From<UpdateRideRequest> for RideUpdate {
    fn from(request: UpdateRideRequest) -> Self {
        Self {
            departure_id: request.departure_id,
            arrival_id: request.arrival_id,
            traffic_condition: request.traffic_condition,
            comment: request.comment,
        }
    }
}

// Query de listado: `?last=true` devuelve sólo el último viaje
#[derive(Debug, Default, Deserialize)]
pub struct RideListQuery {
    #[serde(default)]
    pub last: bool,
}

// Response de viaje
#[derive(Debug, Serialize)]
pub struct RideResponse {
    pub id: RideId,
    pub departure: StopResponse,
    pub arrival: Option<StopResponse>,
    pub traffic_condition: TrafficCondition,
    pub comment: Option<String>,
    pub done: bool,
    pub distance: Option<i64>,
}

impl From<Ride> for RideResponse {
    fn from(ride: Ride) -> Self {
        let done = ride.is_done();
        let distance = ride.distance();
        Self {
            id: ride.id,
            departure: ride.departure.into(),
            arrival: ride.arrival.map(StopResponse::from),
            traffic_condition: ride.traffic_condition,
            comment: ride.comment,
            done,
            distance,
        }
    }
}
