//! Modelo de Location
//!
//! Punto geográfico con nombre único global.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub type LocationId = i64;

/// Location - mapea a la tabla locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Location {
    pub id: LocationId,
    pub driver_id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Campos editables de una ubicación
#[derive(Debug, Clone, PartialEq)]
pub struct LocationFields {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Ubicación aún no persistida
#[derive(Debug, Clone, PartialEq)]
pub struct NewLocation {
    pub driver_id: String,
    pub fields: LocationFields,
}

impl Location {
    pub fn with_fields(&self, fields: LocationFields) -> Self {
        Self {
            id: self.id,
            driver_id: self.driver_id.clone(),
            name: fields.name,
            latitude: fields.latitude,
            longitude: fields.longitude,
        }
    }
}
