use std::sync::Arc;
use validator::Validate;

use super::trimmed;
use crate::dto::ScorecardMetricRequest;
use crate::models::ScoreCardItem;
use crate::repositories::FleetRepository;
use crate::utils::errors::AppResult;

pub struct ScorecardMetricController {
    repository: Arc<dyn FleetRepository>,
}

impl ScorecardMetricController {
    pub fn new(repository: Arc<dyn FleetRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<ScoreCardItem>> {
        self.repository.list_scorecard_metrics().await
    }

    pub async fn create(&self, mut request: ScorecardMetricRequest) -> AppResult<ScoreCardItem> {
        request.sc_description = trimmed(request.sc_description);
        request.validate()?;
        self.repository.create_scorecard_metric(request).await
    }

    pub async fn update(
        &self,
        sc_category_id: i32,
        mut request: ScorecardMetricRequest,
    ) -> AppResult<ScoreCardItem> {
        request.sc_description = trimmed(request.sc_description);
        request.validate()?;
        self.repository
            .update_scorecard_metric(sc_category_id, request)
            .await
    }

    /// Borra la métrica y sus calificaciones
    pub async fn delete(&self, sc_category_id: i32) -> AppResult<()> {
        self.repository.delete_scorecard_metric(sc_category_id).await?;
        log::info!("🗑️ Scorecard metric {} eliminada", sc_category_id);
        Ok(())
    }
}
