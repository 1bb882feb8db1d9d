//! Controladores
//!
//! Validan el cuerpo de la petición, llaman al orquestador y convierten
//! los modelos en DTOs de respuesta.

pub mod driver_controller;
pub mod location_controller;
pub mod ride_controller;
pub mod stop_controller;

pub use driver_controller::DriverController;
pub use location_controller::LocationController;
pub use ride_controller::RideController;
pub use stop_controller::StopController;
