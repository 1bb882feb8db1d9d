//! Almacén en memoria del diario
//!
//! Implementación de [`JournalStore`] protegida por un `RwLock`. Cada
//! escritura se aplica dentro de una sola sección crítica sin puntos de
//! espera, así que nunca queda a medias. Hace cumplir las mismas
//! restricciones que el schema PostgreSQL.
//!
//! Útil para tests y para `STORAGE_BACKEND=memory`; no persiste nada.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use super::journal_store::JournalStore;
use crate::models::{
    Driver, DriverSnapshot, Location, LocationId, NewLocation, NewRide, NewStop, Ride,
    RideCompletion, RideId, RideReplacement, Stop, StopId, TrafficCondition,
};
use crate::utils::errors::{conflict_error, not_found_error, AppError, AppResult};

/// Fila de la tabla rides: referencias a paradas, no paradas
#[derive(Debug, Clone)]
struct RideRow {
    id: RideId,
    driver_id: String,
    departure_id: StopId,
    arrival_id: Option<StopId>,
    traffic_condition: TrafficCondition,
    comment: Option<String>,
}

#[derive(Debug, Default)]
struct Tables {
    drivers: BTreeMap<String, Driver>,
    locations: BTreeMap<LocationId, Location>,
    stops: BTreeMap<StopId, Stop>,
    rides: BTreeMap<RideId, RideRow>,
    last_location_id: LocationId,
    last_stop_id: StopId,
    last_ride_id: RideId,
}

impl Tables {
    fn require_driver(&self, identifier: &str) -> AppResult<()> {
        if self.drivers.contains_key(identifier) {
            Ok(())
        } else {
            Err(not_found_error("Driver", identifier))
        }
    }

    fn check_location_name(&self, name: &str, excluding: Option<LocationId>) -> AppResult<()> {
        let taken = self
            .locations
            .values()
            .any(|l| l.name == name && Some(l.id) != excluding);
        if taken {
            Err(conflict_error("Location", "name", name))
        } else {
            Ok(())
        }
    }

    /// Valida y reserva una parada nueva sin insertarla todavía
    fn prepare_stop(&mut self, stop: &NewStop) -> AppResult<Stop> {
        self.require_driver(&stop.driver_id)?;
        if !self.locations.contains_key(&stop.input.location_id) {
            return Err(not_found_error("Location", stop.input.location_id));
        }
        if self.stops.values().any(|existing| stop.duplicates(existing)) {
            return Err(AppError::Conflict(format!(
                "a stop at {} with odometer {} already exists",
                stop.input.moment, stop.input.odometer_value
            )));
        }
        self.last_stop_id += 1;
        Ok(Stop {
            id: self.last_stop_id,
            driver_id: stop.driver_id.clone(),
            location_id: stop.input.location_id,
            moment: stop.input.moment,
            odometer_value: stop.input.odometer_value,
        })
    }

    fn stop_in_use(&self, stop_id: StopId, excluding: Option<RideId>) -> bool {
        self.rides.values().any(|row| {
            Some(row.id) != excluding
                && (row.departure_id == stop_id || row.arrival_id == Some(stop_id))
        })
    }

    fn has_open_ride(&self, driver_id: &str, excluding: Option<RideId>) -> bool {
        self.rides.values().any(|row| {
            row.driver_id == driver_id && row.arrival_id.is_none() && Some(row.id) != excluding
        })
    }

    fn resolve(&self, row: &RideRow) -> AppResult<Ride> {
        let stop = |id: StopId| {
            self.stops
                .get(&id)
                .cloned()
                .ok_or_else(|| {
                    AppError::Internal(format!("ride {} references missing stop {}", row.id, id))
                })
        };
        Ok(Ride {
            id: row.id,
            driver_id: row.driver_id.clone(),
            departure: stop(row.departure_id)?,
            arrival: row.arrival_id.map(stop).transpose()?,
            traffic_condition: row.traffic_condition,
            comment: row.comment.clone(),
        })
    }
}

/// Almacén en memoria
#[derive(Debug, Default)]
pub struct MemoryJournalStore {
    tables: RwLock<Tables>,
}

/// Convierte un lock envenenado en error de almacenamiento
fn poison_err<T>(_: PoisonError<T>) -> AppError {
    AppError::Storage("memory store lock poisoned".to_string())
}

impl MemoryJournalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JournalStore for MemoryJournalStore {
    async fn insert_driver(&self, driver: &Driver) -> AppResult<()> {
        let mut tables = self.tables.write().map_err(poison_err)?;
        if tables.drivers.contains_key(&driver.identifier) {
            return Err(conflict_error("Driver", "identifier", &driver.identifier));
        }
        tables
            .drivers
            .insert(driver.identifier.clone(), driver.clone());
        log::info!("💾 Conductor '{}' creado", driver.identifier);
        Ok(())
    }

    async fn list_drivers(&self) -> AppResult<Vec<Driver>> {
        let tables = self.tables.read().map_err(poison_err)?;
        Ok(tables.drivers.values().cloned().collect())
    }

    async fn update_driver(&self, driver: &Driver) -> AppResult<()> {
        let mut tables = self.tables.write().map_err(poison_err)?;
        match tables.drivers.get_mut(&driver.identifier) {
            Some(existing) => {
                existing.objective = driver.objective;
                Ok(())
            }
            None => Err(not_found_error("Driver", &driver.identifier)),
        }
    }

    async fn delete_driver(&self, identifier: &str) -> AppResult<bool> {
        let mut tables = self.tables.write().map_err(poison_err)?;
        if tables.drivers.remove(identifier).is_none() {
            return Ok(false);
        }
        tables.rides.retain(|_, row| row.driver_id != identifier);
        tables.stops.retain(|_, stop| stop.driver_id != identifier);
        tables
            .locations
            .retain(|_, location| location.driver_id != identifier);
        log::info!("🗑️ Conductor '{}' eliminado en cascada", identifier);
        Ok(true)
    }

    async fn load_snapshot(&self, identifier: &str) -> AppResult<Option<DriverSnapshot>> {
        let tables = self.tables.read().map_err(poison_err)?;
        let Some(driver) = tables.drivers.get(identifier).cloned() else {
            return Ok(None);
        };
        let rides = tables
            .rides
            .values()
            .filter(|row| row.driver_id == identifier)
            .map(|row| tables.resolve(row))
            .collect::<AppResult<Vec<_>>>()?;
        let stops = tables
            .stops
            .values()
            .filter(|stop| stop.driver_id == identifier)
            .cloned()
            .collect();
        let locations = tables
            .locations
            .values()
            .filter(|location| location.driver_id == identifier)
            .cloned()
            .collect();
        Ok(Some(DriverSnapshot {
            driver,
            rides,
            stops,
            locations,
        }))
    }

    async fn location_name_taken(
        &self,
        name: &str,
        excluding: Option<LocationId>,
    ) -> AppResult<bool> {
        let tables = self.tables.read().map_err(poison_err)?;
        Ok(tables.check_location_name(name, excluding).is_err())
    }

    async fn find_location(&self, id: LocationId) -> AppResult<Option<Location>> {
        let tables = self.tables.read().map_err(poison_err)?;
        Ok(tables.locations.get(&id).cloned())
    }

    async fn insert_location(&self, location: &NewLocation) -> AppResult<Location> {
        let mut tables = self.tables.write().map_err(poison_err)?;
        tables.require_driver(&location.driver_id)?;
        tables.check_location_name(&location.fields.name, None)?;
        tables.last_location_id += 1;
        let created = Location {
            id: tables.last_location_id,
            driver_id: location.driver_id.clone(),
            name: location.fields.name.clone(),
            latitude: location.fields.latitude,
            longitude: location.fields.longitude,
        };
        tables.locations.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_location(&self, location: &Location) -> AppResult<()> {
        let mut tables = self.tables.write().map_err(poison_err)?;
        if !tables.locations.contains_key(&location.id) {
            return Err(not_found_error("Location", location.id));
        }
        tables.check_location_name(&location.name, Some(location.id))?;
        tables.locations.insert(location.id, location.clone());
        Ok(())
    }

    async fn delete_location(&self, id: LocationId) -> AppResult<()> {
        let mut tables = self.tables.write().map_err(poison_err)?;
        if tables.stops.values().any(|stop| stop.location_id == id) {
            return Err(AppError::Conflict(format!(
                "location {} is referenced by a stop",
                id
            )));
        }
        tables
            .locations
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found_error("Location", id))
    }

    async fn insert_stop(&self, stop: &NewStop) -> AppResult<Stop> {
        let mut tables = self.tables.write().map_err(poison_err)?;
        let created = tables.prepare_stop(stop)?;
        tables.stops.insert(created.id, created.clone());
        Ok(created)
    }

    async fn delete_stop(&self, id: StopId) -> AppResult<()> {
        let mut tables = self.tables.write().map_err(poison_err)?;
        if tables.stop_in_use(id, None) {
            return Err(AppError::Conflict(format!("stop {} is used by a ride", id)));
        }
        tables
            .stops
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found_error("Stop", id))
    }

    async fn open_ride(&self, ride: &NewRide) -> AppResult<Ride> {
        let mut tables = self.tables.write().map_err(poison_err)?;
        if tables.has_open_ride(&ride.driver_id, None) {
            return Err(AppError::Conflict(format!(
                "driver '{}' already has an open ride",
                ride.driver_id
            )));
        }
        let departure = tables.prepare_stop(&ride.departure)?;
        tables.last_ride_id += 1;
        let row = RideRow {
            id: tables.last_ride_id,
            driver_id: ride.driver_id.clone(),
            departure_id: departure.id,
            arrival_id: None,
            traffic_condition: TrafficCondition::default(),
            comment: None,
        };
        tables.stops.insert(departure.id, departure);
        tables.rides.insert(row.id, row.clone());
        tables.resolve(&row)
    }

    async fn complete_ride(&self, completion: &RideCompletion) -> AppResult<Ride> {
        let mut tables = self.tables.write().map_err(poison_err)?;
        let row = tables
            .rides
            .get(&completion.ride_id)
            .cloned()
            .ok_or_else(|| not_found_error("Ride", completion.ride_id))?;
        if row.arrival_id.is_some() {
            return Err(AppError::Conflict(format!(
                "ride {} is already completed",
                row.id
            )));
        }
        let arrival = tables.prepare_stop(&completion.arrival)?;
        let row = RideRow {
            arrival_id: Some(arrival.id),
            traffic_condition: completion.traffic_condition,
            comment: completion.comment.clone(),
            ..row
        };
        tables.stops.insert(arrival.id, arrival);
        tables.rides.insert(row.id, row.clone());
        tables.resolve(&row)
    }

    async fn replace_ride(&self, replacement: &RideReplacement) -> AppResult<Ride> {
        let mut tables = self.tables.write().map_err(poison_err)?;
        let row = tables
            .rides
            .get(&replacement.ride_id)
            .cloned()
            .ok_or_else(|| not_found_error("Ride", replacement.ride_id))?;
        let referenced = std::iter::once(replacement.departure_id).chain(replacement.arrival_id);
        for stop_id in referenced {
            if !tables.stops.contains_key(&stop_id) {
                return Err(not_found_error("Stop", stop_id));
            }
            if tables.stop_in_use(stop_id, Some(row.id)) {
                return Err(AppError::Conflict(format!(
                    "stop {} is used by another ride",
                    stop_id
                )));
            }
        }
        if replacement.arrival_id.is_none()
            && tables.has_open_ride(&replacement.driver_id, Some(row.id))
        {
            return Err(AppError::Conflict(format!(
                "driver '{}' already has an open ride",
                replacement.driver_id
            )));
        }
        let row = RideRow {
            departure_id: replacement.departure_id,
            arrival_id: replacement.arrival_id,
            traffic_condition: replacement.traffic_condition,
            comment: replacement.comment.clone(),
            ..row
        };
        tables.rides.insert(row.id, row.clone());
        tables.resolve(&row)
    }

    async fn delete_ride(&self, id: RideId) -> AppResult<bool> {
        let mut tables = self.tables.write().map_err(poison_err)?;
        let Some(row) = tables.rides.remove(&id) else {
            return Ok(false);
        };
        for stop_id in std::iter::once(row.departure_id).chain(row.arrival_id) {
            if !tables.stop_in_use(stop_id, None) {
                tables.stops.remove(&stop_id);
            }
        }
        log::info!("🗑️ Viaje {} eliminado junto con sus paradas", id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LocationFields, StopInput};
    use chrono::NaiveDateTime;

    fn moment(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M").unwrap()
    }

    async fn store_with_location(driver: &str, name: &str) -> (MemoryJournalStore, Location) {
        let store = MemoryJournalStore::new();
        store.insert_driver(&Driver::new(driver, 100)).await.unwrap();
        let location = store
            .insert_location(&NewLocation {
                driver_id: driver.to_string(),
                fields: LocationFields {
                    name: name.to_string(),
                    latitude: 48.85,
                    longitude: 2.35,
                },
            })
            .await
            .unwrap();
        (store, location)
    }

    fn new_stop(driver: &str, location_id: LocationId, at: &str, odometer_value: i64) -> NewStop {
        NewStop {
            driver_id: driver.to_string(),
            input: StopInput {
                moment: moment(at),
                location_id,
                odometer_value,
            },
        }
    }

    #[tokio::test]
    async fn test_duplicate_driver_is_conflict() {
        let store = MemoryJournalStore::new();
        store.insert_driver(&Driver::new("alice", 100)).await.unwrap();
        let result = store.insert_driver(&Driver::new("alice", 5)).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_second_open_ride_is_rejected() {
        let (store, home) = store_with_location("alice", "Home").await;
        store
            .open_ride(&NewRide {
                driver_id: "alice".to_string(),
                departure: new_stop("alice", home.id, "2020-01-01 08:00", 1000),
            })
            .await
            .unwrap();

        let result = store
            .open_ride(&NewRide {
                driver_id: "alice".to_string(),
                departure: new_stop("alice", home.id, "2020-01-01 09:00", 1010),
            })
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
        // La parada de la salida rechazada no se ha guardado
        let snapshot = store.load_snapshot("alice").await.unwrap().unwrap();
        assert_eq!(snapshot.stops.len(), 1);
    }

    #[tokio::test]
    async fn test_referenced_location_cannot_be_deleted() {
        let (store, home) = store_with_location("alice", "Home").await;
        store
            .insert_stop(&new_stop("alice", home.id, "2020-01-01 08:00", 1000))
            .await
            .unwrap();
        let result = store.delete_location(home.id).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_ride_releases_its_stops() {
        let (store, home) = store_with_location("alice", "Home").await;
        let ride = store
            .open_ride(&NewRide {
                driver_id: "alice".to_string(),
                departure: new_stop("alice", home.id, "2020-01-01 08:00", 1000),
            })
            .await
            .unwrap();

        assert!(store.delete_ride(ride.id).await.unwrap());
        let snapshot = store.load_snapshot("alice").await.unwrap().unwrap();
        assert!(snapshot.stops.is_empty());
        store.delete_location(home.id).await.unwrap();
        assert!(!store.delete_ride(ride.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_driver_cascades() {
        let (store, home) = store_with_location("alice", "Home").await;
        store
            .open_ride(&NewRide {
                driver_id: "alice".to_string(),
                departure: new_stop("alice", home.id, "2020-01-01 08:00", 1000),
            })
            .await
            .unwrap();

        assert!(store.delete_driver("alice").await.unwrap());
        assert!(store.load_snapshot("alice").await.unwrap().is_none());
        assert!(store.find_location(home.id).await.unwrap().is_none());
        assert!(!store.location_name_taken("Home", None).await.unwrap());
        assert!(!store.delete_driver("alice").await.unwrap());
    }
}
