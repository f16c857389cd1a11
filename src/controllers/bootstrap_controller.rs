use std::sync::Arc;

use crate::models::Snapshot;
use crate::repositories::FleetRepository;
use crate::utils::errors::AppResult;

pub struct BootstrapController {
    repository: Arc<dyn FleetRepository>,
}

impl BootstrapController {
    pub fn new(repository: Arc<dyn FleetRepository>) -> Self {
        Self { repository }
    }

    /// Las siete colecciones en una sola respuesta
    pub async fn snapshot(&self) -> AppResult<Snapshot> {
        let snapshot = self.repository.snapshot().await?;
        log::debug!(
            "📦 Bootstrap: {} drivers, {} trucks, {} safety events",
            snapshot.drivers.len(),
            snapshot.trucks.len(),
            snapshot.safety_events.len()
        );
        Ok(snapshot)
    }
}
