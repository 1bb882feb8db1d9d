//! Identidad verificada del llamante
//!
//! La capa de transporte la construye a partir del token y se pasa a cada
//! operación del orquestador.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedDriver {
    pub identifier: String,
}

impl AuthenticatedDriver {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }

    /// El llamante es el dueño del conductor pedido
    pub fn owns(&self, driver_id: &str) -> bool {
        self.identifier == driver_id
    }
}
