//! Modelo de Driver
//!
//! Un conductor es dueño de sus viajes, paradas y ubicaciones. El
//! identificador es el mismo que llega verificado en el token.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{location::Location, ride::Ride, stop::Stop};

/// Driver - mapea a la tabla drivers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Driver {
    pub identifier: String,
    /// Objetivo de kilómetros del conductor
    pub objective: i64,
}

impl Driver {
    pub fn new(identifier: impl Into<String>, objective: i64) -> Self {
        Self {
            identifier: identifier.into(),
            objective,
        }
    }
}

/// Vista inmutable del historial completo de un conductor.
///
/// Se carga dentro del ámbito exclusivo del conductor y todas las reglas
/// del ciclo de vida se evalúan sobre ella antes de escribir.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverSnapshot {
    pub driver: Driver,
    pub rides: Vec<Ride>,
    pub stops: Vec<Stop>,
    pub locations: Vec<Location>,
}

/// Estadísticas agregadas de un conductor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverStatistics {
    pub rides: u64,
    pub locations: u64,
    /// Suma de (odómetro de llegada - odómetro de salida) de los viajes cerrados
    pub total_distance: i64,
    pub objective: i64,
    pub objective_reached: bool,
}
