use std::sync::Arc;
use std::time::Duration;

use crate::dto::HealthResponse;
use crate::repositories::FleetRepository;

pub struct HealthController {
    repository: Arc<dyn FleetRepository>,
    timeout: Duration,
}

impl HealthController {
    pub fn new(repository: Arc<dyn FleetRepository>, timeout: Duration) -> Self {
        Self {
            repository,
            timeout,
        }
    }

    /// `Ok` si el repositorio responde dentro del timeout
    pub async fn check(&self) -> Result<HealthResponse, HealthResponse> {
        let time = chrono::Utc::now().to_rfc3339();
        match tokio::time::timeout(self.timeout, self.repository.ping()).await {
            Ok(Ok(())) => Ok(HealthResponse {
                status: "ok".to_string(),
                time,
                error: None,
            }),
            Ok(Err(e)) => {
                log::error!("❌ Health check falló: {}", e);
                Err(HealthResponse {
                    status: "unhealthy".to_string(),
                    time,
                    error: Some(e.to_string()),
                })
            }
            Err(_) => {
                log::error!("❌ Health check sin respuesta en {:?}", self.timeout);
                Err(HealthResponse {
                    status: "unhealthy".to_string(),
                    time,
                    error: Some("repository ping timed out".to_string()),
                })
            }
        }
    }
}
