//! Almacén PostgreSQL del diario
//!
//! Cada escritura corre en su propia transacción: si el futuro se cancela
//! antes del commit, sqlx hace rollback al soltar la transacción. Las
//! escrituras sobre viajes bloquean además la fila del conductor
//! (`FOR UPDATE`) y el índice `one_open_ride_per_driver` garantiza como
//! mucho un viaje abierto aunque haya varias instancias del servicio.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use super::journal_store::JournalStore;
use crate::models::{
    Driver, DriverSnapshot, Location, LocationId, NewLocation, NewRide, NewStop, Ride,
    RideCompletion, RideId, RideReplacement, Stop, StopId, TrafficCondition,
};
use crate::utils::errors::{not_found_error, AppError, AppResult};

const RIDE_SELECT: &str = r#"
    SELECT r.id, r.driver_id, r.traffic_condition, r.comment,
           d.id AS departure_id, d.location_id AS departure_location_id,
           d.moment AS departure_moment, d.odometer_value AS departure_odometer_value,
           a.id AS arrival_id, a.location_id AS arrival_location_id,
           a.moment AS arrival_moment, a.odometer_value AS arrival_odometer_value
    FROM rides r
    JOIN stops d ON d.id = r.departure_id
    LEFT JOIN stops a ON a.id = r.arrival_id
"#;

/// Fila de un viaje con sus dos paradas aplanadas
#[derive(Debug, FromRow)]
struct RideRecord {
    id: RideId,
    driver_id: String,
    traffic_condition: TrafficCondition,
    comment: Option<String>,
    departure_id: StopId,
    departure_location_id: LocationId,
    departure_moment: NaiveDateTime,
    departure_odometer_value: i64,
    arrival_id: Option<StopId>,
    arrival_location_id: Option<LocationId>,
    arrival_moment: Option<NaiveDateTime>,
    arrival_odometer_value: Option<i64>,
}

impl From<RideRecord> for Ride {
    fn from(record: RideRecord) -> Self {
        let arrival = match (
            record.arrival_id,
            record.arrival_location_id,
            record.arrival_moment,
            record.arrival_odometer_value,
        ) {
            (Some(id), Some(location_id), Some(moment), Some(odometer_value)) => Some(Stop {
                id,
                driver_id: record.driver_id.clone(),
                location_id,
                moment,
                odometer_value,
            }),
            _ => None,
        };
        Ride {
            id: record.id,
            departure: Stop {
                id: record.departure_id,
                driver_id: record.driver_id.clone(),
                location_id: record.departure_location_id,
                moment: record.departure_moment,
                odometer_value: record.departure_odometer_value,
            },
            arrival,
            driver_id: record.driver_id,
            traffic_condition: record.traffic_condition,
            comment: record.comment,
        }
    }
}

pub struct PgJournalStore {
    pool: PgPool,
}

impl PgJournalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Bloquea la fila del conductor hasta el final de la transacción
    async fn lock_driver(tx: &mut Transaction<'_, Postgres>, identifier: &str) -> AppResult<()> {
        let locked: Option<(String,)> =
            sqlx::query_as("SELECT identifier FROM drivers WHERE identifier = $1 FOR UPDATE")
                .bind(identifier)
                .fetch_optional(&mut **tx)
                .await?;
        locked
            .map(|_| ())
            .ok_or_else(|| not_found_error("Driver", identifier))
    }

    async fn insert_stop_in(tx: &mut Transaction<'_, Postgres>, stop: &NewStop) -> AppResult<Stop> {
        let created = sqlx::query_as::<_, Stop>(
            r#"
            INSERT INTO stops (driver_id, location_id, moment, odometer_value)
            VALUES ($1, $2, $3, $4)
            RETURNING id, driver_id, location_id, moment, odometer_value
            "#,
        )
        .bind(&stop.driver_id)
        .bind(stop.input.location_id)
        .bind(stop.input.moment)
        .bind(stop.input.odometer_value)
        .fetch_one(&mut **tx)
        .await?;
        Ok(created)
    }

    async fn fetch_ride_in(tx: &mut Transaction<'_, Postgres>, id: RideId) -> AppResult<Ride> {
        let record = sqlx::query_as::<_, RideRecord>(&format!("{} WHERE r.id = $1", RIDE_SELECT))
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| not_found_error("Ride", id))?;
        Ok(record.into())
    }
}

#[async_trait]
impl JournalStore for PgJournalStore {
    async fn insert_driver(&self, driver: &Driver) -> AppResult<()> {
        sqlx::query("INSERT INTO drivers (identifier, objective) VALUES ($1, $2)")
            .bind(&driver.identifier)
            .bind(driver.objective)
            .execute(&self.pool)
            .await?;
        log::info!("💾 Conductor '{}' creado", driver.identifier);
        Ok(())
    }

    async fn list_drivers(&self) -> AppResult<Vec<Driver>> {
        let drivers = sqlx::query_as::<_, Driver>(
            "SELECT identifier, objective FROM drivers ORDER BY identifier",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(drivers)
    }

    async fn update_driver(&self, driver: &Driver) -> AppResult<()> {
        let result = sqlx::query("UPDATE drivers SET objective = $2 WHERE identifier = $1")
            .bind(&driver.identifier)
            .bind(driver.objective)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found_error("Driver", &driver.identifier));
        }
        Ok(())
    }

    async fn delete_driver(&self, identifier: &str) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;
        for statement in [
            "DELETE FROM rides WHERE driver_id = $1",
            "DELETE FROM stops WHERE driver_id = $1",
            "DELETE FROM locations WHERE driver_id = $1",
        ] {
            sqlx::query(statement)
                .bind(identifier)
                .execute(&mut *tx)
                .await?;
        }
        let result = sqlx::query("DELETE FROM drivers WHERE identifier = $1")
            .bind(identifier)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        let deleted = result.rows_affected() > 0;
        if deleted {
            log::info!("🗑️ Conductor '{}' eliminado en cascada", identifier);
        }
        Ok(deleted)
    }

    async fn load_snapshot(&self, identifier: &str) -> AppResult<Option<DriverSnapshot>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let Some(driver) = sqlx::query_as::<_, Driver>(
            "SELECT identifier, objective FROM drivers WHERE identifier = $1",
        )
        .bind(identifier)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };

        let rides = sqlx::query_as::<_, RideRecord>(&format!(
            "{} WHERE r.driver_id = $1 ORDER BY d.moment, r.id",
            RIDE_SELECT
        ))
        .bind(identifier)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(Ride::from)
        .collect();

        let stops = sqlx::query_as::<_, Stop>(
            r#"
            SELECT id, driver_id, location_id, moment, odometer_value
            FROM stops WHERE driver_id = $1 ORDER BY moment, id
            "#,
        )
        .bind(identifier)
        .fetch_all(&mut *tx)
        .await?;

        let locations = sqlx::query_as::<_, Location>(
            r#"
            SELECT id, driver_id, name, latitude, longitude
            FROM locations WHERE driver_id = $1 ORDER BY id
            "#,
        )
        .bind(identifier)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
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
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM locations
                WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(name)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await?;
        Ok(result.0)
    }

    async fn find_location(&self, id: LocationId) -> AppResult<Option<Location>> {
        let location = sqlx::query_as::<_, Location>(
            "SELECT id, driver_id, name, latitude, longitude FROM locations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(location)
    }

    async fn insert_location(&self, location: &NewLocation) -> AppResult<Location> {
        let created = sqlx::query_as::<_, Location>(
            r#"
            INSERT INTO locations (driver_id, name, latitude, longitude)
            VALUES ($1, $2, $3, $4)
            RETURNING id, driver_id, name, latitude, longitude
            "#,
        )
        .bind(&location.driver_id)
        .bind(&location.fields.name)
        .bind(location.fields.latitude)
        .bind(location.fields.longitude)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_location(&self, location: &Location) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE locations SET name = $2, latitude = $3, longitude = $4 WHERE id = $1",
        )
        .bind(location.id)
        .bind(&location.name)
        .bind(location.latitude)
        .bind(location.longitude)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(not_found_error("Location", location.id));
        }
        Ok(())
    }

    async fn delete_location(&self, id: LocationId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found_error("Location", id));
        }
        Ok(())
    }

    async fn insert_stop(&self, stop: &NewStop) -> AppResult<Stop> {
        let mut tx = self.pool.begin().await?;
        let created = Self::insert_stop_in(&mut tx, stop).await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn delete_stop(&self, id: StopId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM stops WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found_error("Stop", id));
        }
        Ok(())
    }

    async fn open_ride(&self, ride: &NewRide) -> AppResult<Ride> {
        let mut tx = self.pool.begin().await?;
        Self::lock_driver(&mut tx, &ride.driver_id).await?;
        let departure = Self::insert_stop_in(&mut tx, &ride.departure).await?;
        let (id,): (RideId,) = sqlx::query_as(
            r#"
            INSERT INTO rides (driver_id, departure_id, traffic_condition)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&ride.driver_id)
        .bind(departure.id)
        .bind(TrafficCondition::default())
        .fetch_one(&mut *tx)
        .await?;
        let created = Self::fetch_ride_in(&mut tx, id).await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn complete_ride(&self, completion: &RideCompletion) -> AppResult<Ride> {
        let mut tx = self.pool.begin().await?;
        Self::lock_driver(&mut tx, &completion.arrival.driver_id).await?;
        let arrival = Self::insert_stop_in(&mut tx, &completion.arrival).await?;
        let result = sqlx::query(
            r#"
            UPDATE rides SET arrival_id = $2, traffic_condition = $3, comment = $4
            WHERE id = $1 AND arrival_id IS NULL
            "#,
        )
        .bind(completion.ride_id)
        .bind(arrival.id)
        .bind(completion.traffic_condition)
        .bind(&completion.comment)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "ride {} is missing or already completed",
                completion.ride_id
            )));
        }
        let completed = Self::fetch_ride_in(&mut tx, completion.ride_id).await?;
        tx.commit().await?;
        Ok(completed)
    }

    async fn replace_ride(&self, replacement: &RideReplacement) -> AppResult<Ride> {
        let mut tx = self.pool.begin().await?;
        Self::lock_driver(&mut tx, &replacement.driver_id).await?;
        let (in_use,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM rides
                WHERE id <> $1
                AND (departure_id IN ($2, $3) OR arrival_id IN ($2, $3))
            )
            "#,
        )
        .bind(replacement.ride_id)
        .bind(replacement.departure_id)
        .bind(replacement.arrival_id)
        .fetch_one(&mut *tx)
        .await?;
        if in_use {
            return Err(AppError::Conflict(
                "a referenced stop is used by another ride".to_string(),
            ));
        }
        let result = sqlx::query(
            r#"
            UPDATE rides
            SET departure_id = $2, arrival_id = $3, traffic_condition = $4, comment = $5
            WHERE id = $1 AND driver_id = $6
            "#,
        )
        .bind(replacement.ride_id)
        .bind(replacement.departure_id)
        .bind(replacement.arrival_id)
        .bind(replacement.traffic_condition)
        .bind(&replacement.comment)
        .bind(&replacement.driver_id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(not_found_error("Ride", replacement.ride_id));
        }
        let replaced = Self::fetch_ride_in(&mut tx, replacement.ride_id).await?;
        tx.commit().await?;
        Ok(replaced)
    }

    async fn delete_ride(&self, id: RideId) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;
        let deleted: Option<(StopId, Option<StopId>)> = sqlx::query_as(
            "DELETE FROM rides WHERE id = $1 RETURNING departure_id, arrival_id",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((departure_id, arrival_id)) = deleted else {
            return Ok(false);
        };

        let stop_ids: Vec<StopId> = std::iter::once(departure_id).chain(arrival_id).collect();
        sqlx::query(
            r#"
            DELETE FROM stops
            WHERE id = ANY($1)
              AND NOT EXISTS (
                  SELECT 1 FROM rides
                  WHERE rides.departure_id = stops.id OR rides.arrival_id = stops.id
              )
            "#,
        )
        .bind(&stop_ids)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        log::info!("🗑️ Viaje {} eliminado junto con sus paradas", id);
        Ok(true)
    }
}
