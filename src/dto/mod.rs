//! DTOs de la API
//!
//! Cuerpos de petición (validados con `validator`) y de respuesta.

pub mod driver_dto;
pub mod location_dto;
pub mod ride_dto;
pub mod stop_dto;

use serde::Serialize;

/// Envoltorio común de las respuestas exitosas
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}
