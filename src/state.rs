//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::JournalStore;
use crate::services::JournalService;
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub journal: Arc<JournalService>,
    pub config: EnvironmentConfig,
    pub jwt: JwtConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn JournalStore>, config: EnvironmentConfig) -> Self {
        Self {
            journal: Arc::new(JournalService::new(store, config.lock_timeout)),
            jwt: JwtConfig::from(&config),
            config,
        }
    }
}
