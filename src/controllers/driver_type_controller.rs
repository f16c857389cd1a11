use std::sync::Arc;
use validator::Validate;

use super::trimmed;
use crate::dto::DriverTypeRequest;
use crate::models::DriverType;
use crate::repositories::FleetRepository;
use crate::utils::errors::AppResult;

pub struct DriverTypeController {
    repository: Arc<dyn FleetRepository>,
}

impl DriverTypeController {
    pub fn new(repository: Arc<dyn FleetRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<DriverType>> {
        self.repository.list_driver_types().await
    }

    pub async fn create(&self, mut request: DriverTypeRequest) -> AppResult<DriverType> {
        request.driver_type = trimmed(request.driver_type);
        request.validate()?;
        self.repository.create_driver_type(request).await
    }

    pub async fn update(
        &self,
        driver_type_id: i32,
        mut request: DriverTypeRequest,
    ) -> AppResult<DriverType> {
        request.driver_type = trimmed(request.driver_type);
        request.validate()?;
        self.repository
            .update_driver_type(driver_type_id, request)
            .await
    }

    /// Los drivers de este tipo quedan sin clasificación
    pub async fn delete(&self, driver_type_id: i32) -> AppResult<()> {
        self.repository.delete_driver_type(driver_type_id).await?;
        log::info!("🗑️ Driver type {} eliminado", driver_type_id);
        Ok(())
    }
}
