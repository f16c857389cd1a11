use std::sync::Arc;
use validator::Validate;

use super::trimmed;
use crate::dto::{AssignmentOutcome, TruckRequest};
use crate::models::{Truck, TruckHistoryEvent};
use crate::repositories::FleetRepository;
use crate::utils::errors::AppResult;

pub struct TruckController {
    repository: Arc<dyn FleetRepository>,
}

impl TruckController {
    pub fn new(repository: Arc<dyn FleetRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Truck>> {
        self.repository.list_trucks().await
    }

    pub async fn create(&self, mut request: TruckRequest) -> AppResult<Truck> {
        request.unit_number = trimmed(request.unit_number);
        request.validate()?;

        let truck = self.repository.create_truck(request).await?;
        log::info!("🚛 Truck {} creado ({})", truck.truck_id, truck.unit_number);
        Ok(truck)
    }

    pub async fn update(&self, truck_id: i32, mut request: TruckRequest) -> AppResult<Truck> {
        request.unit_number = trimmed(request.unit_number);
        request.validate()?;

        let truck = self.repository.update_truck(truck_id, request).await?;
        log::info!("🚛 Truck {} actualizado ({})", truck_id, truck.status);
        Ok(truck)
    }

    /// Borra el truck; el driver que lo tenía queda sin truck
    pub async fn delete(&self, truck_id: i32) -> AppResult<()> {
        self.repository.delete_truck(truck_id).await?;
        log::info!("🗑️ Truck {} eliminado", truck_id);
        Ok(())
    }

    pub async fn history(&self, truck_id: i32) -> AppResult<Vec<TruckHistoryEvent>> {
        self.repository.truck_history(truck_id).await
    }

    /// Asignación desde el lado del truck. `None` libera el truck.
    pub async fn assign_driver(
        &self,
        truck_id: i32,
        driver_id: Option<i32>,
    ) -> AppResult<AssignmentOutcome> {
        match driver_id {
            Some(driver_id) => {
                let outcome = self
                    .repository
                    .assign_driver_to_truck(truck_id, driver_id)
                    .await?;
                log::info!("🚚 Truck {} asignado al driver {}", truck_id, driver_id);
                Ok(outcome)
            }
            None => {
                let outcome = self.repository.release_truck(truck_id).await?;
                log::info!("🚚 Truck {} liberado", truck_id);
                Ok(outcome)
            }
        }
    }
}
