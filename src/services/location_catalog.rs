//! Catálogo de ubicaciones
//!
//! Los nombres de ubicación son únicos entre todos los conductores. Una
//! ubicación sólo se puede borrar cuando ninguna parada la referencia.

use std::sync::Arc;

use tracing::{info, warn};

use crate::models::{DriverSnapshot, Location, LocationFields, LocationId, NewLocation};
use crate::repositories::JournalStore;
use crate::utils::errors::{conflict_error, not_found_error, AppError, AppResult};
use crate::utils::validation::validate_location_fields;

pub struct LocationCatalog {
    store: Arc<dyn JournalStore>,
}

impl LocationCatalog {
    pub fn new(store: Arc<dyn JournalStore>) -> Self {
        Self { store }
    }

    pub async fn exists_by_name(&self, name: &str) -> AppResult<bool> {
        self.store.location_name_taken(name, None).await
    }

    pub async fn exists_by_id(&self, id: LocationId) -> AppResult<bool> {
        Ok(self.store.find_location(id).await?.is_some())
    }

    pub async fn find_by_id(&self, id: LocationId) -> AppResult<Location> {
        self.store
            .find_location(id)
            .await?
            .ok_or_else(|| not_found_error("Location", id))
    }

    /// Ubicación dentro del ámbito del conductor; las ajenas no existen para él
    pub fn find_for(snapshot: &DriverSnapshot, id: LocationId) -> AppResult<&Location> {
        snapshot
            .locations
            .iter()
            .find(|location| location.id == id)
            .ok_or_else(|| not_found_error("Location", id))
    }

    pub async fn create(
        &self,
        snapshot: &DriverSnapshot,
        fields: LocationFields,
    ) -> AppResult<Location> {
        validate_location_fields(&fields)?;
        if self.exists_by_name(&fields.name).await? {
            warn!("📍 Nombre de ubicación duplicado: '{}'", fields.name);
            return Err(conflict_error("Location", "name", &fields.name));
        }
        let location = self
            .store
            .insert_location(&NewLocation {
                driver_id: snapshot.driver.identifier.clone(),
                fields,
            })
            .await?;
        info!(
            "📍 Ubicación {} '{}' creada para '{}'",
            location.id, location.name, location.driver_id
        );
        Ok(location)
    }

    pub async fn update(
        &self,
        snapshot: &DriverSnapshot,
        id: LocationId,
        fields: LocationFields,
    ) -> AppResult<Location> {
        validate_location_fields(&fields)?;
        let current = Self::find_for(snapshot, id)?;
        if current.name != fields.name
            && self.store.location_name_taken(&fields.name, Some(id)).await?
        {
            return Err(conflict_error("Location", "name", &fields.name));
        }
        let updated = current.with_fields(fields);
        self.store.update_location(&updated).await?;
        Ok(updated)
    }

    pub async fn delete(&self, snapshot: &DriverSnapshot, id: LocationId) -> AppResult<()> {
        Self::find_for(snapshot, id)?;
        if snapshot.stops.iter().any(|stop| stop.location_id == id) {
            return Err(AppError::Conflict(format!(
                "Location {} is still referenced by a stop",
                id
            )));
        }
        self.store.delete_location(id).await?;
        info!("📍 Ubicación {} eliminada", id);
        Ok(())
    }
}
