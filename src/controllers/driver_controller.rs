use std::sync::Arc;
use validator::Validate;

use super::trimmed;
use crate::analysis;
use crate::dto::{AssignmentOutcome, DriverRequest};
use crate::models::{Driver, DriverStats};
use crate::repositories::FleetRepository;
use crate::utils::errors::AppResult;

pub struct DriverController {
    repository: Arc<dyn FleetRepository>,
}

impl DriverController {
    pub fn new(repository: Arc<dyn FleetRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Driver>> {
        self.repository.list_drivers().await
    }

    pub async fn create(&self, request: DriverRequest) -> AppResult<Driver> {
        let request = normalize(request);
        request.validate()?;

        let driver = self.repository.create_driver(request).await?;
        log::info!("👤 Driver {} creado ({})", driver.driver_id, driver.driver_code);
        Ok(driver)
    }

    pub async fn update(&self, driver_id: i32, request: DriverRequest) -> AppResult<Driver> {
        let request = normalize(request);
        request.validate()?;

        let driver = self.repository.update_driver(driver_id, request).await?;
        log::info!("👤 Driver {} actualizado", driver_id);
        Ok(driver)
    }

    /// Borra el driver con sus safety events y calificaciones
    pub async fn delete(&self, driver_id: i32) -> AppResult<()> {
        self.repository.delete_driver(driver_id).await?;
        log::info!("🗑️ Driver {} eliminado", driver_id);
        Ok(())
    }

    /// Totales de safety events del driver
    pub async fn stats(&self, driver_id: i32) -> AppResult<DriverStats> {
        let events = self.repository.safety_events_for_driver(driver_id).await?;
        Ok(analysis::driver_stats(driver_id, &events))
    }

    /// Asigna (o desasigna con None) un truck al driver
    pub async fn assign_truck(
        &self,
        driver_id: i32,
        truck_id: Option<i32>,
    ) -> AppResult<AssignmentOutcome> {
        let outcome = self.repository.assign_truck(driver_id, truck_id).await?;
        match truck_id {
            Some(truck_id) => log::info!("🚚 Driver {} asignado al truck {}", driver_id, truck_id),
            None => log::info!("🚚 Driver {} sin truck", driver_id),
        }
        Ok(outcome)
    }
}

fn normalize(mut request: DriverRequest) -> DriverRequest {
    request.driver_code = trimmed(request.driver_code);
    request.first_name = trimmed(request.first_name);
    request.last_name = trimmed(request.last_name);
    request.profile_pic = request.profile_pic.filter(|pic| !pic.is_empty());
    request
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::NewSafetyEvent;
    use crate::dto::SafetyCategoryRequest;
    use crate::models::DriverStanding;
    use crate::repositories::MemoryFleetRepository;
    use crate::utils::errors::AppError;
    use chrono::NaiveDate;

    fn request(code: &str) -> DriverRequest {
        DriverRequest {
            driver_code: code.to_string(),
            first_name: "  Ana ".to_string(),
            last_name: "Lopez".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_trims_and_validates() {
        let controller = DriverController::new(Arc::new(MemoryFleetRepository::new()));
        let driver = controller.create(request("D-100")).await.unwrap();
        assert_eq!(driver.first_name, "Ana");

        let err = controller.create(request("   ")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_stats_flags_warning_above_five() {
        let repo = Arc::new(MemoryFleetRepository::new());
        let controller = DriverController::new(repo.clone());
        let driver = controller.create(request("D-1")).await.unwrap();
        let category = repo
            .create_safety_category(SafetyCategoryRequest {
                code: "SPD".to_string(),
                description: "Speeding".to_string(),
                scoring_system: 3,
                p_i_score: 1,
            })
            .await
            .unwrap();

        for day in [1, 2] {
            repo.create_safety_event(NewSafetyEvent {
                driver_id: driver.driver_id,
                event_date: NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
                category_id: category.category_id,
                notes: String::new(),
                bonus_score: 3,
                p_i_score: 1,
                bonus_period: true,
            })
            .await
            .unwrap();
        }

        let stats = controller.stats(driver.driver_id).await.unwrap();
        assert_eq!(stats.event_count, 2);
        assert_eq!(stats.total_bonus_score, 6);
        assert_eq!(stats.total_p_i_score, 2);
        assert_eq!(stats.status, DriverStanding::Warning);
    }
}
