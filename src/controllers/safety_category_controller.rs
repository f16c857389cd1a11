use std::sync::Arc;
use validator::Validate;

use super::trimmed;
use crate::dto::SafetyCategoryRequest;
use crate::models::SafetyCategory;
use crate::repositories::FleetRepository;
use crate::utils::errors::AppResult;

pub struct SafetyCategoryController {
    repository: Arc<dyn FleetRepository>,
}

impl SafetyCategoryController {
    pub fn new(repository: Arc<dyn FleetRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<SafetyCategory>> {
        self.repository.list_safety_categories().await
    }

    pub async fn create(&self, request: SafetyCategoryRequest) -> AppResult<SafetyCategory> {
        let request = normalize(request);
        request.validate()?;
        self.repository.create_safety_category(request).await
    }

    /// Los eventos ya registrados conservan sus puntajes
    pub async fn update(
        &self,
        category_id: i32,
        request: SafetyCategoryRequest,
    ) -> AppResult<SafetyCategory> {
        let request = normalize(request);
        request.validate()?;
        self.repository
            .update_safety_category(category_id, request)
            .await
    }

    pub async fn delete(&self, category_id: i32) -> AppResult<()> {
        self.repository.delete_safety_category(category_id).await?;
        log::info!("🗑️ Safety category {} eliminada", category_id);
        Ok(())
    }
}

fn normalize(mut request: SafetyCategoryRequest) -> SafetyCategoryRequest {
    request.code = trimmed(request.code);
    request.description = trimmed(request.description);
    request
}
