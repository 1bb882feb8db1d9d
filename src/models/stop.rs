//! Modelo de Stop
//!
//! Una parada marca la salida o la llegada de un viaje: momento, ubicación
//! y valor del odómetro. Es inmutable una vez creada.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::location::LocationId;

pub type StopId = i64;

/// Stop - mapea a la tabla stops
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Stop {
    pub id: StopId,
    pub driver_id: String,
    pub location_id: LocationId,
    pub moment: NaiveDateTime,
    pub odometer_value: i64,
}

/// Datos de una parada a crear
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopInput {
    pub moment: NaiveDateTime,
    pub location_id: LocationId,
    pub odometer_value: i64,
}

/// Parada aún no persistida, ya asociada a su conductor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStop {
    pub driver_id: String,
    pub input: StopInput,
}

impl NewStop {
    /// Dos paradas son duplicadas si coinciden momento, odómetro,
    /// conductor y ubicación
    pub fn duplicates(&self, stop: &Stop) -> bool {
        stop.driver_id == self.driver_id
            && stop.location_id == self.input.location_id
            && stop.moment == self.input.moment
            && stop.odometer_value == self.input.odometer_value
    }
}
