//! Shared application state
//! 
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::{FleetRepository, MemoryFleetRepository};

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn FleetRepository>,
    pub config: EnvironmentConfig,
}

impl AppState {
    pub fn new(repository: Arc<dyn FleetRepository>, config: EnvironmentConfig) -> Self {
        Self { repository, config }
    }

    /// Estado con backend en memoria y configuración por defecto
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryFleetRepository::new()),
            EnvironmentConfig::default(),
        )
    }
}
