//! Ámbito de exclusión por conductor
//!
//! Todas las escrituras sobre un mismo conductor se serializan con un
//! `RwLock` propio; las lecturas comparten el lock y nunca ven una
//! escritura a medias. Conductores distintos nunca se bloquean entre sí.
//! La espera está acotada: al vencer se devuelve `AppError::Timeout`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};
use tracing::warn;

use crate::utils::errors::{AppError, AppResult};

/// Por encima de este tamaño se purgan los locks que nadie usa
const PRUNE_THRESHOLD: usize = 1024;

pub struct DriverLocks {
    locks: Mutex<HashMap<String, Arc<RwLock<()>>>>,
    timeout: Duration,
}

impl DriverLocks {
    pub fn new(timeout: Duration) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn lock_for(&self, driver_id: &str) -> AppResult<Arc<RwLock<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| AppError::Internal("driver lock registry poisoned".to_string()))?;
        if locks.len() > PRUNE_THRESHOLD {
            // Sólo el registro conserva una referencia: nadie lo tiene ni lo espera
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        Ok(locks
            .entry(driver_id.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone())
    }

    /// Acceso exclusivo al conductor
    pub async fn write(&self, driver_id: &str) -> AppResult<OwnedRwLockWriteGuard<()>> {
        let lock = self.lock_for(driver_id)?;
        tokio::time::timeout(self.timeout, lock.write_owned())
            .await
            .map_err(|_| self.timed_out(driver_id))
    }

    /// Acceso compartido al conductor
    pub async fn read(&self, driver_id: &str) -> AppResult<OwnedRwLockReadGuard<()>> {
        let lock = self.lock_for(driver_id)?;
        tokio::time::timeout(self.timeout, lock.read_owned())
            .await
            .map_err(|_| self.timed_out(driver_id))
    }

    fn timed_out(&self, driver_id: &str) -> AppError {
        warn!("⏳ Tiempo de espera agotado para el conductor '{}'", driver_id);
        AppError::Timeout(format!("driver '{}'", driver_id))
    }
}
