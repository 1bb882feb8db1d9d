//! Repositorios
//!
//! Acceso a datos detrás del trait `JournalStore`, con una implementación
//! PostgreSQL y otra en memoria.

pub mod journal_store;
pub mod memory_store;
pub mod postgres_store;

pub use journal_store::JournalStore;
pub use memory_store::MemoryJournalStore;
pub use postgres_store::PgJournalStore;
