use std::collections::HashSet;
use std::sync::Arc;
use validator::Validate;

use crate::dto::{GradeKey, GradeSheet};
use crate::models::ScoreCardEvent;
use crate::repositories::FleetRepository;
use crate::utils::errors::{validation_error, AppError, AppResult};

pub struct ScorecardController {
    repository: Arc<dyn FleetRepository>,
}

impl ScorecardController {
    pub fn new(repository: Arc<dyn FleetRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_events(&self) -> AppResult<Vec<ScoreCardEvent>> {
        self.repository.list_scorecard_events().await
    }

    /// Hoja guardada para la terna; 404 si todavía no se calificó
    pub async fn grade_sheet(&self, key: GradeKey) -> AppResult<GradeSheet> {
        self.repository.grade_sheet(key).await?.ok_or_else(|| {
            AppError::NotFound(format!(
                "No scorecard for driver {} in {} ({})",
                key.driver_id, key.month, key.category
            ))
        })
    }

    /// Reemplaza la calificación completa de la terna
    pub async fn save(&self, mut sheet: GradeSheet) -> AppResult<Vec<ScoreCardEvent>> {
        sheet.validate()?;
        if sheet.scores.is_empty() {
            return Err(validation_error("scores", "at least one metric score is required"));
        }
        let mut seen = HashSet::new();
        if !sheet.scores.iter().all(|s| seen.insert(s.sc_category_id)) {
            return Err(validation_error("scores", "each metric can only be scored once"));
        }
        sheet.notes = sheet.notes.trim().to_string();

        let key = sheet.key();
        let saved = self.repository.replace_grades(sheet).await?;
        log::info!(
            "📝 Scorecard guardado: driver {} {} {} ({} métricas)",
            key.driver_id,
            key.month,
            key.category,
            saved.len()
        );
        Ok(saved)
    }

    /// Borra la calificación completa de la terna
    pub async fn delete(&self, key: GradeKey) -> AppResult<u64> {
        let removed = self.repository.delete_grades(key).await?;
        log::info!(
            "🗑️ Scorecard borrado: driver {} {} {} ({} filas)",
            key.driver_id,
            key.month,
            key.category,
            removed
        );
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::MetricScore;
    use crate::models::ScorecardCategory;

    fn sheet(scores: Vec<MetricScore>) -> GradeSheet {
        GradeSheet {
            driver_id: 1,
            month: "2025-03".parse().unwrap(),
            category: ScorecardCategory::Safety,
            notes: String::new(),
            scores,
        }
    }

    #[tokio::test]
    async fn test_save_rejects_empty_and_duplicate_scores() {
        let controller =
            ScorecardController::new(Arc::new(crate::repositories::MemoryFleetRepository::new()));

        assert!(matches!(
            controller.save(sheet(vec![])).await,
            Err(AppError::Validation(_))
        ));

        let dup = MetricScore {
            sc_category_id: 1,
            sc_score: 2,
        };
        assert!(matches!(
            controller.save(sheet(vec![dup, dup])).await,
            Err(AppError::Validation(_))
        ));

        let out_of_range = MetricScore {
            sc_category_id: 1,
            sc_score: 6,
        };
        assert!(matches!(
            controller.save(sheet(vec![out_of_range])).await,
            Err(AppError::Validation(_))
        ));
    }
}
