//! Sesión de calificación mensual por (driver, mes, categoría)
//!
//! Cambiar de driver, mes o pestaña recarga la hoja desde el store y descarta
//! lo que no se guardó. `is_dirty()` permite avisar antes de cambiar.

use crate::analysis::scorecard::{applicable_metrics, category_overview, CompletionStatus, MAX_METRIC_SCORE};
use crate::client::{ClientResult, FleetApi};
use crate::dto::{GradeKey, GradeSheet, MetricScore};
use crate::models::{ReviewMonth, ScoreCardEvent, ScoreCardItem, ScorecardCategory, Snapshot};
use crate::store::DbStore;

use super::{FormError, DRIVER_REQUIRED, SCORE_OUT_OF_RANGE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradingSession {
    driver_id: Option<i32>,
    month: ReviewMonth,
    category: ScorecardCategory,
    /// (métrica, puntaje) en el orden de las métricas aplicables
    scores: Vec<MetricScore>,
    notes: String,
    /// Última versión cargada o guardada
    baseline: (Vec<MetricScore>, String),
    has_existing_grade: bool,
}

impl GradingSession {
    pub fn new(month: ReviewMonth) -> Self {
        Self {
            driver_id: None,
            month,
            category: ScorecardCategory::Safety,
            scores: Vec::new(),
            notes: String::new(),
            baseline: (Vec::new(), String::new()),
            has_existing_grade: false,
        }
    }

    pub fn driver_id(&self) -> Option<i32> {
        self.driver_id
    }

    pub fn month(&self) -> ReviewMonth {
        self.month
    }

    pub fn category(&self) -> ScorecardCategory {
        self.category
    }

    pub fn scores(&self) -> &[MetricScore] {
        &self.scores
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Hay una calificación guardada para la terna actual
    pub fn has_existing_grade(&self) -> bool {
        self.has_existing_grade
    }

    pub fn key(&self) -> Option<GradeKey> {
        self.driver_id.map(|driver_id| GradeKey {
            driver_id,
            month: self.month,
            category: self.category,
        })
    }

    pub fn is_dirty(&self) -> bool {
        self.scores != self.baseline.0 || self.notes != self.baseline.1
    }

    /// Métricas de la pestaña activa que aplican al driver elegido
    pub fn active_metrics<'a>(&self, snapshot: &'a Snapshot) -> Vec<&'a ScoreCardItem> {
        let Some(driver) = self.driver_id.and_then(|id| snapshot.driver(id)) else {
            return Vec::new();
        };
        applicable_metrics(&snapshot.scorecard_metrics, driver.driver_type_id, self.category)
    }

    /// Estado de las tres pestañas para el driver y mes actuales
    pub fn overview(&self, snapshot: &Snapshot) -> Vec<(ScorecardCategory, CompletionStatus)> {
        category_overview(snapshot, self.driver_id, self.month)
    }

    pub fn select_driver<A: FleetApi>(&mut self, driver_id: Option<i32>, store: &DbStore<A>) {
        self.driver_id = driver_id;
        self.reload(store);
    }

    pub fn select_month<A: FleetApi>(&mut self, month: ReviewMonth, store: &DbStore<A>) {
        self.month = month;
        self.reload(store);
    }

    pub fn select_category<A: FleetApi>(&mut self, category: ScorecardCategory, store: &DbStore<A>) {
        self.category = category;
        self.reload(store);
    }

    /// Recarga la hoja guardada o arranca en blanco con todas las métricas en 0
    pub fn reload<A: FleetApi>(&mut self, store: &DbStore<A>) {
        let metrics: Vec<i32> = self
            .active_metrics(store.state())
            .iter()
            .map(|m| m.sc_category_id)
            .collect();
        let saved = self.key().and_then(|key| store.grade_sheet(key));

        self.has_existing_grade = saved.is_some();
        self.notes = saved.as_ref().map(|s| s.notes.clone()).unwrap_or_default();
        self.scores = metrics
            .into_iter()
            .map(|sc_category_id| MetricScore {
                sc_category_id,
                sc_score: saved
                    .as_ref()
                    .and_then(|s| s.scores.iter().find(|m| m.sc_category_id == sc_category_id))
                    .map(|m| m.sc_score)
                    .unwrap_or(0),
            })
            .collect();
        self.mark_clean();
    }

    fn mark_clean(&mut self) {
        self.baseline = (self.scores.clone(), self.notes.clone());
    }

    /// Puntaje exclusivo entre 0 y 5; 0 es "sin estrellas", no "sin calificar"
    pub fn set_score(&mut self, sc_category_id: i32, score: i32) -> Result<(), FormError> {
        if !(0..=MAX_METRIC_SCORE).contains(&score) {
            return Err(FormError::new(SCORE_OUT_OF_RANGE));
        }
        let entry = self
            .scores
            .iter_mut()
            .find(|m| m.sc_category_id == sc_category_id)
            .ok_or_else(|| FormError::new(format!("Metric {} is not part of this scorecard.", sc_category_id)))?;
        entry.sc_score = score;
        Ok(())
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn to_sheet(&self) -> Result<GradeSheet, FormError> {
        let key = self.key().ok_or_else(|| FormError::new(DRIVER_REQUIRED))?;
        Ok(GradeSheet {
            driver_id: key.driver_id,
            month: key.month,
            category: key.category,
            notes: self.notes.clone(),
            scores: self.scores.clone(),
        })
    }

    /// Reemplaza la calificación completa de la terna
    pub async fn save<A: FleetApi>(
        &mut self,
        store: &mut DbStore<A>,
    ) -> ClientResult<Vec<ScoreCardEvent>> {
        let sheet = self.to_sheet()?;
        if sheet.scores.is_empty() {
            return Err(FormError::new("No metrics apply to this driver in this category.").into());
        }
        let saved = store.save_grades(&sheet).await?;
        self.has_existing_grade = true;
        self.mark_clean();
        log::info!(
            "✅ Scorecard {} {} guardado para driver {}",
            sheet.category,
            sheet.month,
            sheet.driver_id
        );
        Ok(saved)
    }

    /// Borra la calificación y vuelve a la hoja en blanco
    pub async fn delete<A: FleetApi>(&mut self, store: &mut DbStore<A>) -> ClientResult<u64> {
        let key = self.key().ok_or_else(|| FormError::new(DRIVER_REQUIRED))?;
        let removed = store.delete_grades(key).await?;
        self.reload(store);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::InProcessFleetApi;
    use crate::dto::{DriverRequest, ScorecardMetricRequest};
    use crate::repositories::MemoryFleetRepository;
    use std::sync::Arc;

    async fn seeded_store() -> (DbStore<InProcessFleetApi>, i32) {
        let mut store =
            DbStore::new(InProcessFleetApi::new(Arc::new(MemoryFleetRepository::new())));
        store.init().await.unwrap();
        for description in ["Pre-trip inspection", "Seat belt"] {
            store
                .save_scorecard_metric(
                    None,
                    &ScorecardMetricRequest {
                        sc_category: ScorecardCategory::Safety,
                        sc_description: description.to_string(),
                        driver_type_id: None,
                    },
                )
                .await
                .unwrap();
        }
        let driver = store
            .save_driver(
                None,
                &DriverRequest {
                    driver_code: "D7".to_string(),
                    first_name: "Ana".to_string(),
                    last_name: "Lopez".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        (store, driver.driver_id)
    }

    #[tokio::test]
    async fn test_blank_session_then_save_and_reload() {
        let (mut store, driver_id) = seeded_store().await;
        let month: ReviewMonth = "2025-03".parse().unwrap();
        let mut session = GradingSession::new(month);
        assert!(session.to_sheet().is_err());

        session.select_driver(Some(driver_id), &store);
        assert!(!session.has_existing_grade());
        assert_eq!(session.scores().len(), 2);
        assert!(session.scores().iter().all(|m| m.sc_score == 0));
        assert!(!session.is_dirty());

        let first = session.scores()[0].sc_category_id;
        session.set_score(first, 3).unwrap();
        assert!(session.set_score(first, 6).is_err());
        session.set_notes("Solid month");
        assert!(session.is_dirty());

        session.save(&mut store).await.unwrap();
        assert!(!session.is_dirty());
        assert!(session.has_existing_grade());

        let mut reopened = GradingSession::new(month);
        reopened.select_driver(Some(driver_id), &store);
        assert!(reopened.has_existing_grade());
        assert_eq!(reopened.notes(), "Solid month");
        assert_eq!(reopened.scores()[0].sc_score, 3);
        assert_eq!(reopened.scores()[1].sc_score, 0);
        assert_eq!(
            reopened.overview(store.state())[0],
            (ScorecardCategory::Safety, CompletionStatus::Percent(30))
        );
    }

    #[tokio::test]
    async fn test_switching_tab_discards_unsaved_edits() {
        let (store, driver_id) = seeded_store().await;
        let mut session = GradingSession::new("2025-03".parse().unwrap());
        session.select_driver(Some(driver_id), &store);
        let first = session.scores()[0].sc_category_id;
        session.set_score(first, 4).unwrap();

        session.select_category(ScorecardCategory::Dispatch, &store);
        assert!(session.scores().is_empty());
        session.select_category(ScorecardCategory::Safety, &store);
        assert_eq!(session.scores()[0].sc_score, 0);
        assert!(!session.is_dirty());
    }

    #[tokio::test]
    async fn test_delete_resets_to_blank() {
        let (mut store, driver_id) = seeded_store().await;
        let mut session = GradingSession::new("2025-03".parse().unwrap());
        session.select_driver(Some(driver_id), &store);
        let first = session.scores()[0].sc_category_id;
        session.set_score(first, 5).unwrap();
        session.save(&mut store).await.unwrap();

        assert_eq!(session.delete(&mut store).await.unwrap(), 2);
        assert!(!session.has_existing_grade());
        assert!(session.scores().iter().all(|m| m.sc_score == 0));
        assert!(store.state().scorecard_events.is_empty());
    }
}
