//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean al schema
//! PostgreSQL del diario de viajes.

pub mod auth;
pub mod driver;
pub mod location;
pub mod ride;
pub mod stop;

pub use auth::AuthenticatedDriver;
pub use driver::{Driver, DriverSnapshot, DriverStatistics};
pub use location::{Location, LocationFields, LocationId, NewLocation};
pub use ride::{NewRide, Ride, RideCompletion, RideId, RideReplacement, TrafficCondition};
pub use stop::{NewStop, Stop, StopId, StopInput};
