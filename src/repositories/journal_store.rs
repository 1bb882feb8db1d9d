//! Colaborador de persistencia del diario
//!
//! Operaciones CRUD que el motor necesita. Cada método de escritura es una
//! unidad atómica: o se aplica entero o no deja rastro. Las implementaciones
//! también hacen cumplir las restricciones de unicidad e integridad
//! referencial del schema, devolviendo `AppError::Conflict` al violarlas.

use async_trait::async_trait;

use crate::models::{
    Driver, DriverSnapshot, Location, LocationId, NewLocation, NewRide, NewStop, Ride,
    RideCompletion, RideId, RideReplacement, Stop, StopId,
};
use crate::utils::errors::AppResult;

#[async_trait]
pub trait JournalStore: Send + Sync {
    /// Conflict si el identificador ya existe
    async fn insert_driver(&self, driver: &Driver) -> AppResult<()>;
    async fn list_drivers(&self) -> AppResult<Vec<Driver>>;
    async fn update_driver(&self, driver: &Driver) -> AppResult<()>;
    /// Borra en cascada viajes, paradas y ubicaciones. `false` si no existía.
    async fn delete_driver(&self, identifier: &str) -> AppResult<bool>;

    /// Historial completo y consistente de un conductor
    async fn load_snapshot(&self, identifier: &str) -> AppResult<Option<DriverSnapshot>>;

    /// Nombre ya usado por otra ubicación, de cualquier conductor
    async fn location_name_taken(
        &self,
        name: &str,
        excluding: Option<LocationId>,
    ) -> AppResult<bool>;
    async fn find_location(&self, id: LocationId) -> AppResult<Option<Location>>;
    async fn insert_location(&self, location: &NewLocation) -> AppResult<Location>;
    async fn update_location(&self, location: &Location) -> AppResult<()>;
    /// Conflict si alguna parada la referencia
    async fn delete_location(&self, id: LocationId) -> AppResult<()>;

    async fn insert_stop(&self, stop: &NewStop) -> AppResult<Stop>;
    /// Conflict si algún viaje la referencia
    async fn delete_stop(&self, id: StopId) -> AppResult<()>;

    /// Crea la parada de salida y el viaje abierto. Conflict si el
    /// conductor ya tiene un viaje abierto.
    async fn open_ride(&self, ride: &NewRide) -> AppResult<Ride>;
    /// Crea la parada de llegada y cierra el viaje
    async fn complete_ride(&self, completion: &RideCompletion) -> AppResult<Ride>;
    async fn replace_ride(&self, replacement: &RideReplacement) -> AppResult<Ride>;
    /// Borra también sus paradas de salida y llegada si ningún otro viaje
    /// las usa. `false` si no existía.
    async fn delete_ride(&self, id: RideId) -> AppResult<bool>;
}
