//! Modelo de Ride
//!
//! Un viaje va de una parada de salida a una parada de llegada. Mientras
//! la llegada no existe el viaje está abierto y el conductor está conduciendo.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::stop::{NewStop, Stop, StopId};

pub type RideId = i64;

/// Condición del tráfico durante un viaje - mapea al ENUM traffic_condition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "traffic_condition", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrafficCondition {
    ExtremelyCalm,
    Calm,
    #[default]
    Normal,
    Slow,
    ExtremelySlow,
}

/// Ride con sus paradas resueltas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ride {
    pub id: RideId,
    pub driver_id: String,
    pub departure: Stop,
    pub arrival: Option<Stop>,
    pub traffic_condition: TrafficCondition,
    pub comment: Option<String>,
}

impl Ride {
    /// Un viaje está terminado cuando tiene llegada
    pub fn is_done(&self) -> bool {
        self.arrival.is_some()
    }

    pub fn departure_moment(&self) -> NaiveDateTime {
        self.departure.moment
    }

    pub fn uses_stop(&self, stop_id: StopId) -> bool {
        self.departure.id == stop_id || self.arrival.as_ref().is_some_and(|a| a.id == stop_id)
    }

    /// Distancia recorrida según el odómetro; sólo para viajes cerrados
    pub fn distance(&self) -> Option<i64> {
        self.arrival
            .as_ref()
            .map(|arrival| arrival.odometer_value.saturating_sub(self.departure.odometer_value))
    }
}

/// Viaje a abrir junto con su parada de salida
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRide {
    pub driver_id: String,
    pub departure: NewStop,
}

/// Cierre de un viaje abierto
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RideCompletion {
    pub ride_id: RideId,
    pub arrival: NewStop,
    pub traffic_condition: TrafficCondition,
    pub comment: Option<String>,
}

/// Reemplazo de las referencias de un viaje existente
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RideReplacement {
    pub ride_id: RideId,
    pub driver_id: String,
    pub departure_id: StopId,
    pub arrival_id: Option<StopId>,
    pub traffic_condition: TrafficCondition,
    pub comment: Option<String>,
}
