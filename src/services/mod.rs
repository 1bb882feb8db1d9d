//! Services module
//!
//! Lógica de negocio del diario de viajes: orden de paradas, historial del
//! conductor, catálogo de ubicaciones, ciclo de vida de los viajes y el
//! orquestador que serializa las operaciones por conductor.

pub mod driver_ledger;
pub mod driver_locks;
pub mod journal_service;
pub mod location_catalog;
pub mod ride_lifecycle;
pub mod stop_ordering;

pub use driver_ledger::{DriverLedger, HistoryViolation};
pub use driver_locks::DriverLocks;
pub use journal_service::JournalService;
pub use location_catalog::LocationCatalog;
pub use ride_lifecycle::{Arrival, RideUpdate};
pub use stop_ordering::{is_after, Timed};
