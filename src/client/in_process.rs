//! Implementación de `FleetApi` sin red: llama a los controladores
//! sobre cualquier `FleetRepository`. Útil para tests y para embeber.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::{ClientError, ClientResult, FleetApi};
use crate::controllers::{
    BootstrapController, DriverController, DriverTypeController, HealthController,
    SafetyCategoryController, SafetyEventController, ScorecardController,
    ScorecardMetricController, TruckController,
};
use crate::dto::{
    AssignmentOutcome, DriverRequest, DriverTypeRequest, GradeKey, GradeSheet, HealthResponse,
    NewSafetyEvent, SafetyCategoryRequest, SafetyEventUpdate, ScorecardMetricRequest,
    TruckRequest,
};
use crate::models::{
    Driver, DriverStats, DriverType, SafetyCategory, SafetyEvent, ScoreCardEvent, ScoreCardItem,
    Snapshot, Truck, TruckHistoryEvent,
};
use crate::repositories::FleetRepository;
use crate::utils::errors::AppError;

#[derive(Clone)]
pub struct InProcessFleetApi {
    repository: Arc<dyn FleetRepository>,
}

impl InProcessFleetApi {
    pub fn new(repository: Arc<dyn FleetRepository>) -> Self {
        Self { repository }
    }

    fn repo(&self) -> Arc<dyn FleetRepository> {
        self.repository.clone()
    }
}

#[async_trait]
impl FleetApi for InProcessFleetApi {
    async fn health(&self) -> ClientResult<HealthResponse> {
        HealthController::new(self.repo(), Duration::from_secs(5))
            .check()
            .await
            .map_err(|body| ClientError::Api {
                status: 503,
                message: body.error.unwrap_or(body.status),
            })
    }

    async fn bootstrap(&self) -> ClientResult<Snapshot> {
        Ok(BootstrapController::new(self.repo()).snapshot().await?)
    }

    async fn create_driver(&self, request: &DriverRequest) -> ClientResult<Driver> {
        Ok(DriverController::new(self.repo())
            .create(request.clone())
            .await?)
    }

    async fn update_driver(&self, driver_id: i32, request: &DriverRequest) -> ClientResult<Driver> {
        Ok(DriverController::new(self.repo())
            .update(driver_id, request.clone())
            .await?)
    }

    async fn delete_driver(&self, driver_id: i32) -> ClientResult<()> {
        Ok(DriverController::new(self.repo()).delete(driver_id).await?)
    }

    async fn driver_stats(&self, driver_id: i32) -> ClientResult<DriverStats> {
        Ok(DriverController::new(self.repo()).stats(driver_id).await?)
    }

    async fn assign_truck(
        &self,
        driver_id: i32,
        truck_id: Option<i32>,
    ) -> ClientResult<AssignmentOutcome> {
        Ok(DriverController::new(self.repo())
            .assign_truck(driver_id, truck_id)
            .await?)
    }

    async fn create_truck(&self, request: &TruckRequest) -> ClientResult<Truck> {
        Ok(TruckController::new(self.repo())
            .create(request.clone())
            .await?)
    }

    async fn update_truck(&self, truck_id: i32, request: &TruckRequest) -> ClientResult<Truck> {
        Ok(TruckController::new(self.repo())
            .update(truck_id, request.clone())
            .await?)
    }

    async fn delete_truck(&self, truck_id: i32) -> ClientResult<()> {
        Ok(TruckController::new(self.repo()).delete(truck_id).await?)
    }

    async fn truck_history(&self, truck_id: i32) -> ClientResult<Vec<TruckHistoryEvent>> {
        Ok(TruckController::new(self.repo()).history(truck_id).await?)
    }

    async fn assign_driver(
        &self,
        truck_id: i32,
        driver_id: Option<i32>,
    ) -> ClientResult<AssignmentOutcome> {
        Ok(TruckController::new(self.repo())
            .assign_driver(truck_id, driver_id)
            .await?)
    }

    async fn create_driver_type(&self, request: &DriverTypeRequest) -> ClientResult<DriverType> {
        Ok(DriverTypeController::new(self.repo())
            .create(request.clone())
            .await?)
    }

    async fn update_driver_type(
        &self,
        driver_type_id: i32,
        request: &DriverTypeRequest,
    ) -> ClientResult<DriverType> {
        Ok(DriverTypeController::new(self.repo())
            .update(driver_type_id, request.clone())
            .await?)
    }

    async fn delete_driver_type(&self, driver_type_id: i32) -> ClientResult<()> {
        Ok(DriverTypeController::new(self.repo())
            .delete(driver_type_id)
            .await?)
    }

    async fn create_safety_category(
        &self,
        request: &SafetyCategoryRequest,
    ) -> ClientResult<SafetyCategory> {
        Ok(SafetyCategoryController::new(self.repo())
            .create(request.clone())
            .await?)
    }

    async fn update_safety_category(
        &self,
        category_id: i32,
        request: &SafetyCategoryRequest,
    ) -> ClientResult<SafetyCategory> {
        Ok(SafetyCategoryController::new(self.repo())
            .update(category_id, request.clone())
            .await?)
    }

    async fn delete_safety_category(&self, category_id: i32) -> ClientResult<()> {
        Ok(SafetyCategoryController::new(self.repo())
            .delete(category_id)
            .await?)
    }

    async fn create_scorecard_metric(
        &self,
        request: &ScorecardMetricRequest,
    ) -> ClientResult<ScoreCardItem> {
        Ok(ScorecardMetricController::new(self.repo())
            .create(request.clone())
            .await?)
    }

    async fn update_scorecard_metric(
        &self,
        sc_category_id: i32,
        request: &ScorecardMetricRequest,
    ) -> ClientResult<ScoreCardItem> {
        Ok(ScorecardMetricController::new(self.repo())
            .update(sc_category_id, request.clone())
            .await?)
    }

    async fn delete_scorecard_metric(&self, sc_category_id: i32) -> ClientResult<()> {
        Ok(ScorecardMetricController::new(self.repo())
            .delete(sc_category_id)
            .await?)
    }

    async fn create_safety_event(&self, event: &NewSafetyEvent) -> ClientResult<SafetyEvent> {
        Ok(SafetyEventController::new(self.repo())
            .create(event.clone())
            .await?)
    }

    async fn update_safety_event(
        &self,
        safety_event_id: i32,
        update: &SafetyEventUpdate,
    ) -> ClientResult<SafetyEvent> {
        Ok(SafetyEventController::new(self.repo())
            .update(safety_event_id, update.clone())
            .await?)
    }

    async fn delete_safety_event(&self, safety_event_id: i32) -> ClientResult<()> {
        Ok(SafetyEventController::new(self.repo())
            .delete(safety_event_id)
            .await?)
    }

    async fn grade_sheet(&self, key: GradeKey) -> ClientResult<Option<GradeSheet>> {
        match ScorecardController::new(self.repo()).grade_sheet(key).await {
            Ok(sheet) => Ok(Some(sheet)),
            Err(AppError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save_grades(&self, sheet: &GradeSheet) -> ClientResult<Vec<ScoreCardEvent>> {
        Ok(ScorecardController::new(self.repo())
            .save(sheet.clone())
            .await?)
    }

    async fn delete_grades(&self, key: GradeKey) -> ClientResult<u64> {
        Ok(ScorecardController::new(self.repo()).delete(key).await?)
    }
}
