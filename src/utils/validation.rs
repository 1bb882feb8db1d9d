//! Utilidades de validación
//!
//! Funciones puras que validan los datos de entrada del motor y devuelven
//! la lista estructurada de violaciones (`ValidationErrors`).

use serde::Serialize;
use validator::{ValidationError, ValidationErrors};

use crate::models::{LocationFields, StopInput};

/// Longitud máxima de un identificador de conductor
pub const MAX_IDENTIFIER_LENGTH: usize = 64;
/// Longitud máxima del nombre de una ubicación
pub const MAX_LOCATION_NAME_LENGTH: usize = 255;

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar longitud mínima y máxima
pub fn validate_length(value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min || len > max {
        let mut error = ValidationError::new("length");
        error.add_param("min".into(), &min);
        error.add_param("max".into(), &max);
        error.add_param("actual".into(), &len);
        return Err(error);
    }
    Ok(())
}

/// Validar latitud en [-90, 90]
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if !(-90.0..=90.0).contains(&lat) {
        let mut error = ValidationError::new("latitude");
        error.add_param("value".into(), &lat);
        error.add_param("range".into(), &"-90.0 to 90.0".to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar longitud geográfica en [-180, 180]
pub fn validate_longitude(lng: f64) -> Result<(), ValidationError> {
    if !(-180.0..=180.0).contains(&lng) {
        let mut error = ValidationError::new("longitude");
        error.add_param("value".into(), &lng);
        error.add_param("range".into(), &"-180.0 to 180.0".to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor sea no negativo
pub fn validate_non_negative<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value < T::zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validar un identificador de conductor: no vacío, sin espacios
pub fn validate_identifier(value: &str) -> Result<(), ValidationError> {
    validate_not_empty(value)?;
    validate_length(value, 1, MAX_IDENTIFIER_LENGTH)?;
    if value.chars().any(char::is_whitespace) {
        let mut error = ValidationError::new("identifier");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

fn collect(
    checks: Vec<(&'static str, Result<(), ValidationError>)>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for (field, check) in checks {
        if let Err(error) = check {
            errors.add(field, error);
        }
    }
    if errors.errors().is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validar los datos de alta o edición de un conductor
pub fn validate_driver(identifier: &str, objective: i64) -> Result<(), ValidationErrors> {
    collect(vec![
        ("identifier", validate_identifier(identifier)),
        ("objective", validate_non_negative(objective)),
    ])
}

/// Validar los campos de una ubicación
pub fn validate_location_fields(fields: &LocationFields) -> Result<(), ValidationErrors> {
    collect(vec![
        (
            "name",
            validate_not_empty(&fields.name)
                .and_then(|_| validate_length(&fields.name, 1, MAX_LOCATION_NAME_LENGTH)),
        ),
        ("latitude", validate_latitude(fields.latitude)),
        ("longitude", validate_longitude(fields.longitude)),
    ])
}

/// Validar los datos de una parada
pub fn validate_stop_input(input: &StopInput) -> Result<(), ValidationErrors> {
    collect(vec![(
        "odometer_value",
        validate_non_negative(input.odometer_value),
    )])
}
