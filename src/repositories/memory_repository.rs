//! Backend en memoria de `FleetRepository`
//!
//! Usado por los tests y por `STORAGE=memory`. Cada operación toma el lock
//! una sola vez, valida todo antes de mutar y por eso es atómica igual que
//! las transacciones de PostgreSQL.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use tokio::sync::Mutex;

use super::{assignment_note, graded_metric_moved_error, FleetRepository, UNASSIGNED_NOTE};
use crate::dto::{
    AssignmentOutcome, DriverRequest, DriverTypeRequest, GradeKey, GradeSheet, MetricScore,
    NewSafetyEvent, SafetyCategoryRequest, SafetyEventUpdate, ScorecardMetricRequest,
    TruckRequest,
};
use crate::models::{
    Driver, DriverType, SafetyCategory, SafetyEvent, ScoreCardEvent, ScoreCardItem, Snapshot,
    Truck, TruckHistoryEvent, TruckHistoryType, TruckStatus,
};
use crate::utils::errors::{
    bad_request_error, not_found_error, unknown_reference_error, AppError, AppResult,
};

#[derive(Debug, Default)]
struct Sequences {
    truck: i32,
    driver_type: i32,
    driver: i32,
    safety_category: i32,
    scorecard_metric: i32,
    safety_event: i32,
    scorecard_event: i32,
    truck_history: i32,
}

fn next(seq: &mut i32) -> i32 {
    *seq += 1;
    *seq
}

#[derive(Debug, Default)]
struct Tables {
    trucks: Vec<Truck>,
    driver_types: Vec<DriverType>,
    drivers: Vec<Driver>,
    safety_categories: Vec<SafetyCategory>,
    scorecard_metrics: Vec<ScoreCardItem>,
    safety_events: Vec<SafetyEvent>,
    scorecard_events: Vec<ScoreCardEvent>,
    truck_history: Vec<TruckHistoryEvent>,
    seq: Sequences,
}

impl Tables {
    fn driver_mut(&mut self, driver_id: i32) -> Option<&mut Driver> {
        self.drivers.iter_mut().find(|d| d.driver_id == driver_id)
    }

    fn truck_mut(&mut self, truck_id: i32) -> Option<&mut Truck> {
        self.trucks.iter_mut().find(|t| t.truck_id == truck_id)
    }

    fn has_driver(&self, driver_id: i32) -> bool {
        self.drivers.iter().any(|d| d.driver_id == driver_id)
    }

    fn has_truck(&self, truck_id: i32) -> bool {
        self.trucks.iter().any(|t| t.truck_id == truck_id)
    }

    fn has_driver_type(&self, driver_type_id: i32) -> bool {
        self.driver_types
            .iter()
            .any(|t| t.driver_type_id == driver_type_id)
    }

    fn truck(&self, truck_id: i32) -> Option<Truck> {
        self.trucks.iter().find(|t| t.truck_id == truck_id).cloned()
    }

    fn driver(&self, driver_id: i32) -> Option<Driver> {
        self.drivers.iter().find(|d| d.driver_id == driver_id).cloned()
    }

    fn set_truck_status(&mut self, truck_id: i32, status: TruckStatus) {
        if let Some(truck) = self.truck_mut(truck_id) {
            truck.status = status;
        }
    }

    fn log_history(
        &mut self,
        truck_id: i32,
        driver_id: Option<i32>,
        event_type: TruckHistoryType,
        notes: String,
    ) {
        let truck_history_id = next(&mut self.seq.truck_history);
        self.truck_history.push(TruckHistoryEvent {
            truck_history_id,
            truck_id,
            driver_id,
            date: Utc::now(),
            event_type,
            notes: Some(notes),
        });
    }

    fn check_driver_refs(&self, request: &DriverRequest) -> AppResult<()> {
        if let Some(truck_id) = request.truck_id {
            if !self.has_truck(truck_id) {
                return Err(unknown_reference_error("Truck", truck_id));
            }
        }
        if let Some(driver_type_id) = request.driver_type_id {
            if !self.has_driver_type(driver_type_id) {
                return Err(unknown_reference_error("Driver type", driver_type_id));
            }
        }
        Ok(())
    }

    /// Lógica de asignación driver ↔ truck. Las referencias ya están validadas.
    fn apply_assignment(&mut self, driver_id: i32, target: Option<i32>) -> AssignmentOutcome {
        let previous = self.driver(driver_id).and_then(|d| d.truck_id);
        if previous == target {
            if let Some(truck_id) = target {
                self.set_truck_status(truck_id, TruckStatus::Assigned);
            }
            return AssignmentOutcome {
                driver: self.driver(driver_id),
                truck: target.and_then(|id| self.truck(id)),
                released_truck: None,
            };
        }

        let mut released = None;
        if let Some(old_truck_id) = previous {
            self.set_truck_status(old_truck_id, TruckStatus::Available);
            self.log_history(
                old_truck_id,
                None,
                TruckHistoryType::StatusChange,
                UNASSIGNED_NOTE.to_string(),
            );
            released = Some(old_truck_id);
        }

        match target {
            Some(truck_id) => {
                for other in self
                    .drivers
                    .iter_mut()
                    .filter(|d| d.truck_id == Some(truck_id) && d.driver_id != driver_id)
                {
                    other.truck_id = None;
                }
                if let Some(driver) = self.driver_mut(driver_id) {
                    driver.truck_id = Some(truck_id);
                }
                self.set_truck_status(truck_id, TruckStatus::Assigned);
                self.log_history(
                    truck_id,
                    Some(driver_id),
                    TruckHistoryType::Assignment,
                    assignment_note(driver_id),
                );
            }
            None => {
                if let Some(driver) = self.driver_mut(driver_id) {
                    driver.truck_id = None;
                }
            }
        }

        AssignmentOutcome {
            driver: self.driver(driver_id),
            truck: target.and_then(|id| self.truck(id)),
            released_truck: released.and_then(|id| self.truck(id)),
        }
    }

    fn metric_ids_for(&self, key: &GradeKey) -> HashSet<i32> {
        self.scorecard_metrics
            .iter()
            .filter(|m| m.sc_category == key.category)
            .map(|m| m.sc_category_id)
            .collect()
    }

    fn grade_rows(&self, key: &GradeKey) -> Vec<ScoreCardEvent> {
        let metric_ids = self.metric_ids_for(key);
        let mut rows: Vec<ScoreCardEvent> = self
            .scorecard_events
            .iter()
            .filter(|e| {
                e.driver_id == key.driver_id
                    && key.month.contains(e.event_date)
                    && metric_ids.contains(&e.sc_category_id)
            })
            .cloned()
            .collect();
        rows.sort_by_key(|e| (e.sc_category_id, e.scorecard_event_id));
        rows
    }

    fn remove_grade_rows(&mut self, key: &GradeKey) -> u64 {
        let metric_ids = self.metric_ids_for(key);
        let before = self.scorecard_events.len();
        self.scorecard_events.retain(|e| {
            !(e.driver_id == key.driver_id
                && key.month.contains(e.event_date)
                && metric_ids.contains(&e.sc_category_id))
        });
        (before - self.scorecard_events.len()) as u64
    }
}

/// Repositorio en memoria con las mismas reglas que PostgreSQL
#[derive(Debug, Default)]
pub struct MemoryFleetRepository {
    tables: Mutex<Tables>,
}

impl MemoryFleetRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FleetRepository for MemoryFleetRepository {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn snapshot(&self) -> AppResult<Snapshot> {
        let t = self.tables.lock().await;
        Ok(Snapshot {
            trucks: t.trucks.clone(),
            driver_types: t.driver_types.clone(),
            drivers: t.drivers.clone(),
            safety_categories: t.safety_categories.clone(),
            scorecard_metrics: t.scorecard_metrics.clone(),
            safety_events: t.safety_events.clone(),
            scorecard_events: t.scorecard_events.clone(),
        })
    }

    // --- Drivers ---

    async fn list_drivers(&self) -> AppResult<Vec<Driver>> {
        Ok(self.tables.lock().await.drivers.clone())
    }

    async fn create_driver(&self, request: DriverRequest) -> AppResult<Driver> {
        let mut t = self.tables.lock().await;
        t.check_driver_refs(&request)?;

        let driver_id = next(&mut t.seq.driver);
        t.drivers.push(Driver {
            driver_id,
            driver_code: request.driver_code,
            first_name: request.first_name,
            last_name: request.last_name,
            start_date: request.start_date,
            truck_id: None,
            driver_type_id: request.driver_type_id,
            profile_pic: request.profile_pic,
        });
        if request.truck_id.is_some() {
            t.apply_assignment(driver_id, request.truck_id);
        }

        t.driver(driver_id)
            .ok_or_else(|| AppError::Internal("driver vanished after insert".to_string()))
    }

    async fn update_driver(&self, driver_id: i32, request: DriverRequest) -> AppResult<Driver> {
        let mut t = self.tables.lock().await;
        let current_truck = t
            .driver(driver_id)
            .ok_or_else(|| not_found_error("Driver", driver_id))?
            .truck_id;
        t.check_driver_refs(&request)?;

        if let Some(driver) = t.driver_mut(driver_id) {
            driver.driver_code = request.driver_code;
            driver.first_name = request.first_name;
            driver.last_name = request.last_name;
            driver.start_date = request.start_date;
            driver.driver_type_id = request.driver_type_id;
            driver.profile_pic = request.profile_pic;
        }
        if current_truck != request.truck_id {
            t.apply_assignment(driver_id, request.truck_id);
        }

        t.driver(driver_id)
            .ok_or_else(|| not_found_error("Driver", driver_id))
    }

    async fn delete_driver(&self, driver_id: i32) -> AppResult<()> {
        let mut t = self.tables.lock().await;
        let driver = t
            .driver(driver_id)
            .ok_or_else(|| not_found_error("Driver", driver_id))?;

        t.safety_events.retain(|e| e.driver_id != driver_id);
        t.scorecard_events.retain(|e| e.driver_id != driver_id);
        if let Some(truck_id) = driver.truck_id {
            t.set_truck_status(truck_id, TruckStatus::Available);
            t.log_history(
                truck_id,
                None,
                TruckHistoryType::StatusChange,
                UNASSIGNED_NOTE.to_string(),
            );
        }
        for entry in t
            .truck_history
            .iter_mut()
            .filter(|h| h.driver_id == Some(driver_id))
        {
            entry.driver_id = None;
        }
        t.drivers.retain(|d| d.driver_id != driver_id);
        Ok(())
    }

    async fn safety_events_for_driver(&self, driver_id: i32) -> AppResult<Vec<SafetyEvent>> {
        let t = self.tables.lock().await;
        if !t.has_driver(driver_id) {
            return Err(not_found_error("Driver", driver_id));
        }
        Ok(t.safety_events
            .iter()
            .filter(|e| e.driver_id == driver_id)
            .cloned()
            .collect())
    }

    // --- Asignación ---

    async fn assign_truck(
        &self,
        driver_id: i32,
        truck_id: Option<i32>,
    ) -> AppResult<AssignmentOutcome> {
        let mut t = self.tables.lock().await;
        if !t.has_driver(driver_id) {
            return Err(not_found_error("Driver", driver_id));
        }
        if let Some(truck_id) = truck_id {
            if !t.has_truck(truck_id) {
                return Err(unknown_reference_error("Truck", truck_id));
            }
        }
        Ok(t.apply_assignment(driver_id, truck_id))
    }

    async fn assign_driver_to_truck(
        &self,
        truck_id: i32,
        driver_id: i32,
    ) -> AppResult<AssignmentOutcome> {
        let mut t = self.tables.lock().await;
        if !t.has_truck(truck_id) {
            return Err(not_found_error("Truck", truck_id));
        }
        if !t.has_driver(driver_id) {
            return Err(unknown_reference_error("Driver", driver_id));
        }
        Ok(t.apply_assignment(driver_id, Some(truck_id)))
    }

    async fn release_truck(&self, truck_id: i32) -> AppResult<AssignmentOutcome> {
        let mut t = self.tables.lock().await;
        if !t.has_truck(truck_id) {
            return Err(not_found_error("Truck", truck_id));
        }

        for driver in t
            .drivers
            .iter_mut()
            .filter(|d| d.truck_id == Some(truck_id))
        {
            driver.truck_id = None;
        }
        t.set_truck_status(truck_id, TruckStatus::Available);
        t.log_history(
            truck_id,
            None,
            TruckHistoryType::StatusChange,
            UNASSIGNED_NOTE.to_string(),
        );

        Ok(AssignmentOutcome {
            driver: None,
            truck: t.truck(truck_id),
            released_truck: None,
        })
    }

    // --- Trucks ---

    async fn list_trucks(&self) -> AppResult<Vec<Truck>> {
        Ok(self.tables.lock().await.trucks.clone())
    }

    async fn create_truck(&self, request: TruckRequest) -> AppResult<Truck> {
        if request.status == Some(TruckStatus::Assigned) {
            return Err(bad_request_error(
                "a new truck cannot start as assigned; assign a driver instead",
            ));
        }
        let mut t = self.tables.lock().await;
        let truck = Truck {
            truck_id: next(&mut t.seq.truck),
            unit_number: request.unit_number,
            year: request.year,
            status: request.status.unwrap_or_default(),
        };
        t.trucks.push(truck.clone());
        Ok(truck)
    }

    async fn update_truck(&self, truck_id: i32, request: TruckRequest) -> AppResult<Truck> {
        let mut t = self.tables.lock().await;
        let current = t
            .truck(truck_id)
            .ok_or_else(|| not_found_error("Truck", truck_id))?;
        let has_holder = t.drivers.iter().any(|d| d.truck_id == Some(truck_id));
        let status = super::resolve_truck_status(current.status, request.status, has_holder)?;

        if let Some(truck) = t.truck_mut(truck_id) {
            truck.unit_number = request.unit_number;
            truck.year = request.year;
            truck.status = status;
        }
        if status != current.status {
            let (event_type, notes) = super::status_change_entry(current.status, status);
            t.log_history(truck_id, None, event_type, notes);
        }

        t.truck(truck_id)
            .ok_or_else(|| not_found_error("Truck", truck_id))
    }

    async fn delete_truck(&self, truck_id: i32) -> AppResult<()> {
        let mut t = self.tables.lock().await;
        if !t.has_truck(truck_id) {
            return Err(not_found_error("Truck", truck_id));
        }
        for driver in t
            .drivers
            .iter_mut()
            .filter(|d| d.truck_id == Some(truck_id))
        {
            driver.truck_id = None;
        }
        t.truck_history.retain(|h| h.truck_id != truck_id);
        t.trucks.retain(|tr| tr.truck_id != truck_id);
        Ok(())
    }

    async fn truck_history(&self, truck_id: i32) -> AppResult<Vec<TruckHistoryEvent>> {
        let t = self.tables.lock().await;
        if !t.has_truck(truck_id) {
            return Err(not_found_error("Truck", truck_id));
        }
        let mut history: Vec<TruckHistoryEvent> = t
            .truck_history
            .iter()
            .filter(|h| h.truck_id == truck_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then(b.truck_history_id.cmp(&a.truck_history_id))
        });
        Ok(history)
    }

    // --- Driver types ---

    async fn list_driver_types(&self) -> AppResult<Vec<DriverType>> {
        Ok(self.tables.lock().await.driver_types.clone())
    }

    async fn create_driver_type(&self, request: DriverTypeRequest) -> AppResult<DriverType> {
        let mut t = self.tables.lock().await;
        let driver_type = DriverType {
            driver_type_id: next(&mut t.seq.driver_type),
            driver_type: request.driver_type,
        };
        t.driver_types.push(driver_type.clone());
        Ok(driver_type)
    }

    async fn update_driver_type(
        &self,
        driver_type_id: i32,
        request: DriverTypeRequest,
    ) -> AppResult<DriverType> {
        let mut t = self.tables.lock().await;
        let driver_type = t
            .driver_types
            .iter_mut()
            .find(|dt| dt.driver_type_id == driver_type_id)
            .ok_or_else(|| not_found_error("Driver type", driver_type_id))?;
        driver_type.driver_type = request.driver_type;
        Ok(driver_type.clone())
    }

    async fn delete_driver_type(&self, driver_type_id: i32) -> AppResult<()> {
        let mut t = self.tables.lock().await;
        if !t.has_driver_type(driver_type_id) {
            return Err(not_found_error("Driver type", driver_type_id));
        }
        for driver in t
            .drivers
            .iter_mut()
            .filter(|d| d.driver_type_id == Some(driver_type_id))
        {
            driver.driver_type_id = None;
        }
        t.driver_types
            .retain(|dt| dt.driver_type_id != driver_type_id);
        Ok(())
    }

    // --- Safety categories ---

    async fn list_safety_categories(&self) -> AppResult<Vec<SafetyCategory>> {
        Ok(self.tables.lock().await.safety_categories.clone())
    }

    async fn create_safety_category(
        &self,
        request: SafetyCategoryRequest,
    ) -> AppResult<SafetyCategory> {
        let mut t = self.tables.lock().await;
        let category = SafetyCategory {
            category_id: next(&mut t.seq.safety_category),
            code: request.code,
            description: request.description,
            scoring_system: request.scoring_system,
            p_i_score: request.p_i_score,
        };
        t.safety_categories.push(category.clone());
        Ok(category)
    }

    async fn update_safety_category(
        &self,
        category_id: i32,
        request: SafetyCategoryRequest,
    ) -> AppResult<SafetyCategory> {
        let mut t = self.tables.lock().await;
        let category = t
            .safety_categories
            .iter_mut()
            .find(|c| c.category_id == category_id)
            .ok_or_else(|| not_found_error("Safety category", category_id))?;
        category.code = request.code;
        category.description = request.description;
        category.scoring_system = request.scoring_system;
        category.p_i_score = request.p_i_score;
        Ok(category.clone())
    }

    async fn delete_safety_category(&self, category_id: i32) -> AppResult<()> {
        let mut t = self.tables.lock().await;
        let before = t.safety_categories.len();
        t.safety_categories.retain(|c| c.category_id != category_id);
        if t.safety_categories.len() == before {
            return Err(not_found_error("Safety category", category_id));
        }
        Ok(())
    }

    // --- Scorecard metrics ---

    async fn list_scorecard_metrics(&self) -> AppResult<Vec<ScoreCardItem>> {
        Ok(self.tables.lock().await.scorecard_metrics.clone())
    }

    async fn create_scorecard_metric(
        &self,
        request: ScorecardMetricRequest,
    ) -> AppResult<ScoreCardItem> {
        let mut t = self.tables.lock().await;
        if let Some(driver_type_id) = request.driver_type_id {
            if !t.has_driver_type(driver_type_id) {
                return Err(unknown_reference_error("Driver type", driver_type_id));
            }
        }
        let metric = ScoreCardItem {
            sc_category_id: next(&mut t.seq.scorecard_metric),
            sc_category: request.sc_category,
            sc_description: request.sc_description,
            driver_type_id: request.driver_type_id,
        };
        t.scorecard_metrics.push(metric.clone());
        Ok(metric)
    }

    async fn update_scorecard_metric(
        &self,
        sc_category_id: i32,
        request: ScorecardMetricRequest,
    ) -> AppResult<ScoreCardItem> {
        let mut t = self.tables.lock().await;
        if let Some(driver_type_id) = request.driver_type_id {
            if !t.has_driver_type(driver_type_id) {
                return Err(unknown_reference_error("Driver type", driver_type_id));
            }
        }
        let graded = t
            .scorecard_events
            .iter()
            .any(|e| e.sc_category_id == sc_category_id);
        let metric = t
            .scorecard_metrics
            .iter_mut()
            .find(|m| m.sc_category_id == sc_category_id)
            .ok_or_else(|| not_found_error("Scorecard metric", sc_category_id))?;
        if graded && metric.sc_category != request.sc_category {
            return Err(graded_metric_moved_error(sc_category_id));
        }
        metric.sc_category = request.sc_category;
        metric.sc_description = request.sc_description;
        metric.driver_type_id = request.driver_type_id;
        Ok(metric.clone())
    }

    async fn delete_scorecard_metric(&self, sc_category_id: i32) -> AppResult<()> {
        let mut t = self.tables.lock().await;
        let before = t.scorecard_metrics.len();
        t.scorecard_metrics
            .retain(|m| m.sc_category_id != sc_category_id);
        if t.scorecard_metrics.len() == before {
            return Err(not_found_error("Scorecard metric", sc_category_id));
        }
        t.scorecard_events
            .retain(|e| e.sc_category_id != sc_category_id);
        Ok(())
    }

    // --- Safety events ---

    async fn list_safety_events(&self) -> AppResult<Vec<SafetyEvent>> {
        Ok(self.tables.lock().await.safety_events.clone())
    }

    async fn create_safety_event(&self, event: NewSafetyEvent) -> AppResult<SafetyEvent> {
        let mut t = self.tables.lock().await;
        if !t.has_driver(event.driver_id) {
            return Err(unknown_reference_error("Driver", event.driver_id));
        }
        if !t
            .safety_categories
            .iter()
            .any(|c| c.category_id == event.category_id)
        {
            return Err(unknown_reference_error("Safety category", event.category_id));
        }

        let saved = SafetyEvent {
            safety_event_id: next(&mut t.seq.safety_event),
            driver_id: event.driver_id,
            event_date: event.event_date,
            category_id: event.category_id,
            notes: event.notes,
            bonus_score: event.bonus_score,
            p_i_score: event.p_i_score,
            bonus_period: event.bonus_period,
        };
        t.safety_events.push(saved.clone());
        Ok(saved)
    }

    async fn update_safety_event(
        &self,
        safety_event_id: i32,
        update: SafetyEventUpdate,
    ) -> AppResult<SafetyEvent> {
        let mut t = self.tables.lock().await;
        let event = t
            .safety_events
            .iter_mut()
            .find(|e| e.safety_event_id == safety_event_id)
            .ok_or_else(|| not_found_error("Safety event", safety_event_id))?;
        event.event_date = update.event_date;
        event.notes = update.notes;
        Ok(event.clone())
    }

    async fn delete_safety_event(&self, safety_event_id: i32) -> AppResult<()> {
        let mut t = self.tables.lock().await;
        let before = t.safety_events.len();
        t.safety_events
            .retain(|e| e.safety_event_id != safety_event_id);
        if t.safety_events.len() == before {
            return Err(not_found_error("Safety event", safety_event_id));
        }
        Ok(())
    }

    // --- Scorecard events ---

    async fn list_scorecard_events(&self) -> AppResult<Vec<ScoreCardEvent>> {
        Ok(self.tables.lock().await.scorecard_events.clone())
    }

    async fn grade_sheet(&self, key: GradeKey) -> AppResult<Option<GradeSheet>> {
        let t = self.tables.lock().await;
        Ok(super::sheet_from_rows(key, t.grade_rows(&key)))
    }

    async fn replace_grades(&self, sheet: GradeSheet) -> AppResult<Vec<ScoreCardEvent>> {
        let mut t = self.tables.lock().await;
        if !t.has_driver(sheet.driver_id) {
            return Err(unknown_reference_error("Driver", sheet.driver_id));
        }
        for MetricScore { sc_category_id, .. } in &sheet.scores {
            let metric = t
                .scorecard_metrics
                .iter()
                .find(|m| m.sc_category_id == *sc_category_id)
                .ok_or_else(|| unknown_reference_error("Scorecard metric", *sc_category_id))?;
            if metric.sc_category != sheet.category {
                return Err(bad_request_error(&format!(
                    "scorecard metric {} belongs to {}, not {}",
                    sc_category_id, metric.sc_category, sheet.category
                )));
            }
        }

        let key = sheet.key();
        t.remove_grade_rows(&key);
        let mut saved = Vec::with_capacity(sheet.scores.len());
        for score in &sheet.scores {
            let row = ScoreCardEvent {
                scorecard_event_id: next(&mut t.seq.scorecard_event),
                driver_id: sheet.driver_id,
                event_date: sheet.month.first_day(),
                sc_category_id: score.sc_category_id,
                sc_score: score.sc_score,
                notes: sheet.notes.clone(),
            };
            t.scorecard_events.push(row.clone());
            saved.push(row);
        }
        Ok(saved)
    }

    async fn delete_grades(&self, key: GradeKey) -> AppResult<u64> {
        let mut t = self.tables.lock().await;
        Ok(t.remove_grade_rows(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReviewMonth, ScorecardCategory};
    use chrono::NaiveDate;

    fn driver_request(code: &str, truck_id: Option<i32>) -> DriverRequest {
        DriverRequest {
            driver_code: code.to_string(),
            first_name: "Test".to_string(),
            last_name: code.to_string(),
            truck_id,
            ..Default::default()
        }
    }

    fn truck_request(unit: &str) -> TruckRequest {
        TruckRequest {
            unit_number: unit.to_string(),
            year: 2020,
            status: None,
        }
    }

    #[tokio::test]
    async fn test_assignment_moves_driver_between_trucks() {
        let repo = MemoryFleetRepository::new();
        let a = repo.create_truck(truck_request("A-1")).await.unwrap();
        let b = repo.create_truck(truck_request("B-2")).await.unwrap();
        let driver = repo
            .create_driver(driver_request("D1", Some(a.truck_id)))
            .await
            .unwrap();
        assert_eq!(driver.truck_id, Some(a.truck_id));

        let outcome = repo
            .assign_truck(driver.driver_id, Some(b.truck_id))
            .await
            .unwrap();
        assert_eq!(outcome.driver.unwrap().truck_id, Some(b.truck_id));
        assert_eq!(outcome.truck.unwrap().status, TruckStatus::Assigned);
        assert_eq!(outcome.released_truck.unwrap().status, TruckStatus::Available);
    }

    #[tokio::test]
    async fn test_assigning_taken_truck_displaces_holder() {
        let repo = MemoryFleetRepository::new();
        let truck = repo.create_truck(truck_request("T-9")).await.unwrap();
        let first = repo
            .create_driver(driver_request("D1", Some(truck.truck_id)))
            .await
            .unwrap();
        let second = repo.create_driver(driver_request("D2", None)).await.unwrap();

        repo.assign_truck(second.driver_id, Some(truck.truck_id))
            .await
            .unwrap();

        let drivers = repo.list_drivers().await.unwrap();
        let holders: Vec<_> = drivers
            .iter()
            .filter(|d| d.truck_id == Some(truck.truck_id))
            .map(|d| d.driver_id)
            .collect();
        assert_eq!(holders, vec![second.driver_id]);
        assert!(drivers
            .iter()
            .any(|d| d.driver_id == first.driver_id && d.truck_id.is_none()));
    }

    #[tokio::test]
    async fn test_assign_driver_to_truck_separates_missing_truck_and_driver() {
        let repo = MemoryFleetRepository::new();
        let truck = repo.create_truck(truck_request("T-5")).await.unwrap();
        let driver = repo.create_driver(driver_request("D1", None)).await.unwrap();

        assert!(matches!(
            repo.assign_driver_to_truck(99, driver.driver_id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            repo.assign_driver_to_truck(truck.truck_id, 99).await,
            Err(AppError::BadRequest(_))
        ));

        let outcome = repo
            .assign_driver_to_truck(truck.truck_id, driver.driver_id)
            .await
            .unwrap();
        assert_eq!(outcome.driver.unwrap().truck_id, Some(truck.truck_id));
        assert_eq!(outcome.truck.unwrap().status, TruckStatus::Assigned);
    }

    #[tokio::test]
    async fn test_update_truck_rejects_status_that_breaks_invariant() {
        let repo = MemoryFleetRepository::new();
        let truck = repo.create_truck(truck_request("T-1")).await.unwrap();

        let mut request = truck_request("T-1");
        request.status = Some(TruckStatus::Assigned);
        assert!(matches!(
            repo.update_truck(truck.truck_id, request).await,
            Err(AppError::BadRequest(_))
        ));

        repo.create_driver(driver_request("D1", Some(truck.truck_id)))
            .await
            .unwrap();
        let mut request = truck_request("T-1");
        request.status = Some(TruckStatus::Maintenance);
        assert!(matches!(
            repo.update_truck(truck.truck_id, request).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_replace_grades_rejects_metric_from_other_category() {
        let repo = MemoryFleetRepository::new();
        let driver = repo.create_driver(driver_request("D1", None)).await.unwrap();
        let dispatch = repo
            .create_scorecard_metric(ScorecardMetricRequest {
                sc_category: ScorecardCategory::Dispatch,
                sc_description: "On-time check calls".to_string(),
                driver_type_id: None,
            })
            .await
            .unwrap();

        let sheet = GradeSheet {
            driver_id: driver.driver_id,
            month: "2025-03".parse::<ReviewMonth>().unwrap(),
            category: ScorecardCategory::Safety,
            notes: String::new(),
            scores: vec![MetricScore {
                sc_category_id: dispatch.sc_category_id,
                sc_score: 4,
            }],
        };
        assert!(matches!(
            repo.replace_grades(sheet).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(repo.list_scorecard_events().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_safety_event_requires_existing_driver_and_category() {
        let repo = MemoryFleetRepository::new();
        let event = NewSafetyEvent {
            driver_id: 42,
            event_date: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            category_id: 1,
            notes: String::new(),
            bonus_score: 3,
            p_i_score: 1,
            bonus_period: true,
        };
        assert!(matches!(
            repo.create_safety_event(event).await,
            Err(AppError::BadRequest(_))
        ));
    }
}
