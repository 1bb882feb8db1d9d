use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Location, LocationFields, LocationId};

// Request para crear o editar una ubicación; las coordenadas se
// comprueban en el catálogo
#[derive(Debug, Deserialize, Validate)]
pub struct LocationRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<LocationRequest> for LocationFields {
    fn from(request: LocationRequest) -> Self {
        Self {
            name: request.name,
            latitude: request.latitude,
            longitude: request.longitude,
        }
    }
}

// Response de ubicación
#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub id: LocationId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Location> for LocationResponse {
    fn from(location: Location) -> Self {
        Self {
            id: location.id,
            name: location.name,
            latitude: location.latitude,
            longitude: location.longitude,
        }
    }
}
