//! Orquestador del diario de viajes
//!
//! Punto de entrada de todas las operaciones. Cada llamada:
//! 1. comprueba que el llamante es el dueño del conductor pedido,
//! 2. entra en el ámbito del conductor (exclusivo para escrituras,
//!    compartido para lecturas) y carga la foto de su historial,
//! 3. decide con las reglas puras del ciclo de vida,
//! 4. aplica la escritura resultante con una sola llamada atómica al almacén.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard};
use tracing::{debug, info, warn};

use crate::models::{
    AuthenticatedDriver, Driver, DriverSnapshot, DriverStatistics, Location, LocationFields,
    LocationId, Ride, RideId, Stop, StopId, StopInput,
};
use crate::repositories::JournalStore;
use crate::utils::errors::{forbidden_error, invalid_state_error, not_found_error, AppResult};
use crate::utils::validation::validate_driver;

use super::driver_ledger::DriverLedger;
use super::driver_locks::DriverLocks;
use super::location_catalog::LocationCatalog;
use super::ride_lifecycle::{self, Arrival, RideUpdate};

/// Foto del conductor tomada dentro de su ámbito exclusivo
struct Exclusive {
    _guard: OwnedRwLockWriteGuard<()>,
    snapshot: DriverSnapshot,
}

/// Foto del conductor tomada dentro de su ámbito compartido
struct Shared {
    _guard: OwnedRwLockReadGuard<()>,
    snapshot: DriverSnapshot,
}

pub struct JournalService {
    store: Arc<dyn JournalStore>,
    locks: DriverLocks,
    locations: LocationCatalog,
}

/// Registra los rechazos del dominio sin alterar el resultado
fn logged<T>(operation: &str, driver_id: &str, result: AppResult<T>) -> AppResult<T> {
    if let Err(error) = &result {
        warn!("⚠️ {} para '{}' rechazado: {}", operation, driver_id, error);
    }
    result
}

fn require_owner(caller: &AuthenticatedDriver, driver_id: &str, operation: &str) -> AppResult<()> {
    if caller.owns(driver_id) {
        Ok(())
    } else {
        Err(forbidden_error(operation, "restricted to the owner"))
    }
}

impl JournalService {
    pub fn new(store: Arc<dyn JournalStore>, lock_timeout: Duration) -> Self {
        Self {
            locations: LocationCatalog::new(store.clone()),
            locks: DriverLocks::new(lock_timeout),
            store,
        }
    }

    async fn load(&self, driver_id: &str) -> AppResult<DriverSnapshot> {
        let snapshot = self
            .store
            .load_snapshot(driver_id)
            .await?
            .ok_or_else(|| not_found_error("Driver", driver_id))?;
        debug!(
            "📖 Historial de '{}' cargado: {} viajes, {} paradas, {} ubicaciones",
            driver_id,
            snapshot.rides.len(),
            snapshot.stops.len(),
            snapshot.locations.len()
        );
        Ok(snapshot)
    }

    async fn exclusive(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        operation: &str,
    ) -> AppResult<Exclusive> {
        require_owner(caller, driver_id, operation)?;
        let guard = self.locks.write(driver_id).await?;
        let snapshot = self.load(driver_id).await?;
        Ok(Exclusive {
            _guard: guard,
            snapshot,
        })
    }

    async fn shared(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        operation: &str,
    ) -> AppResult<Shared> {
        require_owner(caller, driver_id, operation)?;
        let guard = self.locks.read(driver_id).await?;
        let snapshot = self.load(driver_id).await?;
        Ok(Shared {
            _guard: guard,
            snapshot,
        })
    }

    // Conductores

    pub async fn create_driver(
        &self,
        caller: &AuthenticatedDriver,
        identifier: &str,
        objective: i64,
    ) -> AppResult<Driver> {
        require_owner(caller, identifier, "create the driver")?;
        validate_driver(identifier, objective)?;
        let _guard = self.locks.write(identifier).await?;
        let driver = Driver::new(identifier, objective);
        logged(
            "Alta de conductor",
            identifier,
            self.store.insert_driver(&driver).await,
        )?;
        info!("🚗 Conductor '{}' creado con objetivo {}", identifier, objective);
        Ok(driver)
    }

    pub async fn get_driver(
        &self,
        caller: &AuthenticatedDriver,
        identifier: &str,
    ) -> AppResult<Driver> {
        Ok(self.shared(caller, identifier, "read the driver").await?.snapshot.driver)
    }

    pub async fn list_drivers(&self, _caller: &AuthenticatedDriver) -> AppResult<Vec<Driver>> {
        self.store.list_drivers().await
    }

    pub async fn update_driver(
        &self,
        caller: &AuthenticatedDriver,
        identifier: &str,
        objective: i64,
    ) -> AppResult<Driver> {
        validate_driver(identifier, objective)?;
        let scope = self.exclusive(caller, identifier, "update the driver").await?;
        let driver = Driver {
            objective,
            ..scope.snapshot.driver
        };
        self.store.update_driver(&driver).await?;
        info!("🚗 Objetivo de '{}' actualizado a {}", identifier, objective);
        Ok(driver)
    }

    pub async fn delete_driver(
        &self,
        caller: &AuthenticatedDriver,
        identifier: &str,
    ) -> AppResult<()> {
        let _scope = self.exclusive(caller, identifier, "delete the driver").await?;
        if !self.store.delete_driver(identifier).await? {
            return Err(not_found_error("Driver", identifier));
        }
        info!("🚗 Conductor '{}' eliminado", identifier);
        Ok(())
    }

    pub async fn driver_statistics(
        &self,
        caller: &AuthenticatedDriver,
        identifier: &str,
    ) -> AppResult<DriverStatistics> {
        let scope = self.shared(caller, identifier, "read the statistics").await?;
        let snapshot = &scope.snapshot;
        let total_distance = DriverLedger::new(&snapshot.rides).total_distance();
        Ok(DriverStatistics {
            rides: snapshot.rides.len() as u64,
            locations: snapshot.locations.len() as u64,
            total_distance,
            objective: snapshot.driver.objective,
            objective_reached: total_distance >= snapshot.driver.objective,
        })
    }

    // Ubicaciones

    pub async fn create_location(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        fields: LocationFields,
    ) -> AppResult<Location> {
        let scope = self.exclusive(caller, driver_id, "create a location").await?;
        logged(
            "Alta de ubicación",
            driver_id,
            self.locations.create(&scope.snapshot, fields).await,
        )
    }

    pub async fn get_location(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        id: LocationId,
    ) -> AppResult<Location> {
        let scope = self.shared(caller, driver_id, "read a location").await?;
        LocationCatalog::find_for(&scope.snapshot, id).cloned()
    }

    pub async fn list_locations(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
    ) -> AppResult<Vec<Location>> {
        Ok(self
            .shared(caller, driver_id, "read the locations")
            .await?
            .snapshot
            .locations)
    }

    pub async fn update_location(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        id: LocationId,
        fields: LocationFields,
    ) -> AppResult<Location> {
        let scope = self.exclusive(caller, driver_id, "update a location").await?;
        logged(
            "Edición de ubicación",
            driver_id,
            self.locations.update(&scope.snapshot, id, fields).await,
        )
    }

    pub async fn delete_location(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        id: LocationId,
    ) -> AppResult<()> {
        let scope = self.exclusive(caller, driver_id, "delete a location").await?;
        logged(
            "Borrado de ubicación",
            driver_id,
            self.locations.delete(&scope.snapshot, id).await,
        )
    }

    // Paradas

    pub async fn create_stop(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        input: StopInput,
    ) -> AppResult<Stop> {
        let scope = self.exclusive(caller, driver_id, "create a stop").await?;
        let stop = logged(
            "Alta de parada",
            driver_id,
            ride_lifecycle::plan_stop(&scope.snapshot, input),
        )?;
        let stop = self.store.insert_stop(&stop).await?;
        info!("🛑 Parada {} creada para '{}'", stop.id, driver_id);
        Ok(stop)
    }

    pub async fn get_stop(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        id: StopId,
    ) -> AppResult<Stop> {
        let scope = self.shared(caller, driver_id, "read a stop").await?;
        ride_lifecycle::find_stop(&scope.snapshot, id).cloned()
    }

    pub async fn list_stops(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
    ) -> AppResult<Vec<Stop>> {
        Ok(self
            .shared(caller, driver_id, "read the stops")
            .await?
            .snapshot
            .stops)
    }

    pub async fn delete_stop(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        id: StopId,
    ) -> AppResult<()> {
        let scope = self.exclusive(caller, driver_id, "delete a stop").await?;
        let id = logged(
            "Borrado de parada",
            driver_id,
            ride_lifecycle::plan_stop_deletion(&scope.snapshot, id),
        )?;
        self.store.delete_stop(id).await?;
        info!("🛑 Parada {} eliminada", id);
        Ok(())
    }

    // Viajes

    /// Abre un viaje nuevo. La comprobación `can_start_with` y la inserción
    /// ocurren dentro del mismo ámbito exclusivo.
    pub async fn start_ride(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        departure: StopInput,
    ) -> AppResult<Ride> {
        let scope = self.exclusive(caller, driver_id, "start a ride").await?;
        let ride = logged(
            "Salida",
            driver_id,
            ride_lifecycle::plan_start(&scope.snapshot, departure),
        )?;
        let ride = logged("Salida", driver_id, self.store.open_ride(&ride).await)?;
        info!("🚦 Viaje {} iniciado por '{}'", ride.id, driver_id);
        Ok(ride)
    }

    pub async fn complete_ride(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        ride_id: RideId,
        arrival: Arrival,
    ) -> AppResult<Ride> {
        let scope = self.exclusive(caller, driver_id, "complete a ride").await?;
        let completion = logged(
            "Llegada",
            driver_id,
            ride_lifecycle::plan_completion(&scope.snapshot, ride_id, arrival),
        )?;
        let ride = self.store.complete_ride(&completion).await?;
        info!("🏁 Viaje {} terminado por '{}'", ride.id, driver_id);
        Ok(ride)
    }

    pub async fn update_ride(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        ride_id: RideId,
        update: RideUpdate,
    ) -> AppResult<Ride> {
        let scope = self.exclusive(caller, driver_id, "update a ride").await?;
        let replacement = logged(
            "Edición de viaje",
            driver_id,
            ride_lifecycle::plan_replacement(&scope.snapshot, ride_id, update),
        )?;
        let ride = self.store.replace_ride(&replacement).await?;
        info!("✏️ Viaje {} actualizado por '{}'", ride.id, driver_id);
        Ok(ride)
    }

    pub async fn get_ride(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        ride_id: RideId,
    ) -> AppResult<Ride> {
        let scope = self.shared(caller, driver_id, "read a ride").await?;
        ride_lifecycle::find_ride(&scope.snapshot, ride_id).cloned()
    }

    /// Viajes en orden cronológico, o sólo el último con `last_only`
    pub async fn list_rides(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        last_only: bool,
    ) -> AppResult<Vec<Ride>> {
        let scope = self.shared(caller, driver_id, "read the rides").await?;
        let ledger = DriverLedger::new(&scope.snapshot.rides);
        if last_only {
            return ledger
                .last_ride()
                .map(|ride| vec![ride.clone()])
                .ok_or_else(|| invalid_state_error("get the last ride", "the driver has no rides"));
        }
        Ok(ledger.chronological().into_iter().cloned().collect())
    }

    pub async fn delete_ride(
        &self,
        caller: &AuthenticatedDriver,
        driver_id: &str,
        ride_id: RideId,
    ) -> AppResult<()> {
        let scope = self.exclusive(caller, driver_id, "delete a ride").await?;
        let ride_id = logged(
            "Borrado de viaje",
            driver_id,
            ride_lifecycle::plan_deletion(&scope.snapshot, ride_id),
        )?;
        if !self.store.delete_ride(ride_id).await? {
            return Err(not_found_error("Ride", ride_id));
        }
        info!("🗑️ Viaje {} eliminado", ride_id);
        Ok(())
    }

    /// Comprueba el estado del almacén; lo usa el endpoint de salud
    pub async fn ping(&self) -> AppResult<()> {
        self.store.list_drivers().await.map(|_| ())
    }
}

impl std::fmt::Debug for JournalService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournalService")
            .field("lock_timeout", &self.locks.timeout())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryJournalStore;
    use crate::utils::errors::AppError;
    use chrono::NaiveDateTime;

    fn departure(location_id: LocationId) -> StopInput {
        StopInput {
            moment: NaiveDateTime::parse_from_str("2020-01-01 08:00", "%Y-%m-%d %H:%M").unwrap(),
            location_id,
            odometer_value: 1000,
        }
    }

    fn place(name: &str) -> LocationFields {
        LocationFields {
            name: name.to_string(),
            latitude: 48.85,
            longitude: 2.35,
        }
    }

    async fn enrolled(service: &JournalService, driver: &str) -> LocationId {
        let caller = AuthenticatedDriver::new(driver);
        service.create_driver(&caller, driver, 0).await.unwrap();
        let home = format!("{}-home", driver);
        service
            .create_location(&caller, driver, place(&home))
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_held_driver_scope_times_out_only_that_driver() {
        let store: Arc<dyn JournalStore> = Arc::new(MemoryJournalStore::new());
        let service = JournalService::new(store, Duration::from_millis(50));
        let alice = AuthenticatedDriver::new("alice");
        let bob = AuthenticatedDriver::new("bob");
        let alice_home = enrolled(&service, "alice").await;
        let bob_home = enrolled(&service, "bob").await;

        let held = service.locks.write("alice").await.unwrap();
        let err = service
            .start_ride(&alice, "alice", departure(alice_home))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Timeout(_)));

        // bob no comparte ámbito con alice
        service
            .start_ride(&bob, "bob", departure(bob_home))
            .await
            .unwrap();

        drop(held);
        let ride = service
            .start_ride(&alice, "alice", departure(alice_home))
            .await
            .unwrap();
        assert!(!ride.is_done());
    }
}
