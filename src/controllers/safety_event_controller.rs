use std::sync::Arc;
use validator::Validate;

use crate::dto::{NewSafetyEvent, SafetyEventUpdate};
use crate::models::SafetyEvent;
use crate::repositories::FleetRepository;
use crate::utils::errors::AppResult;

pub struct SafetyEventController {
    repository: Arc<dyn FleetRepository>,
}

impl SafetyEventController {
    pub fn new(repository: Arc<dyn FleetRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<SafetyEvent>> {
        self.repository.list_safety_events().await
    }

    pub async fn create(&self, mut event: NewSafetyEvent) -> AppResult<SafetyEvent> {
        event.notes = event.notes.trim().to_string();
        event.validate()?;

        let saved = self.repository.create_safety_event(event).await?;
        log::info!(
            "⚠️ Safety event {} registrado para driver {} ({:+} bonus)",
            saved.safety_event_id,
            saved.driver_id,
            saved.bonus_score
        );
        Ok(saved)
    }

    pub async fn update(
        &self,
        safety_event_id: i32,
        mut update: SafetyEventUpdate,
    ) -> AppResult<SafetyEvent> {
        update.notes = update.notes.trim().to_string();
        update.validate()?;

        let saved = self
            .repository
            .update_safety_event(safety_event_id, update)
            .await?;
        log::info!(
            "✏️ Safety event {} corregido ({})",
            saved.safety_event_id,
            saved.event_date
        );
        Ok(saved)
    }

    pub async fn delete(&self, safety_event_id: i32) -> AppResult<()> {
        self.repository.delete_safety_event(safety_event_id).await?;
        log::info!("🗑️ Safety event {} eliminado", safety_event_id);
        Ok(())
    }
}
