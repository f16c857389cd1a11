use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use super::deleted;
use crate::controllers::SafetyEventController;
use crate::dto::{NewSafetyEvent, SafetyEventUpdate};
use crate::models::SafetyEvent;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_safety_event_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/:id", put(update_event).delete(delete_event))
}

async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<SafetyEvent>>, AppError> {
    let controller = SafetyEventController::new(state.repository.clone());
    Ok(Json(controller.list().await?))
}

async fn create_event(
    State(state): State<AppState>,
    Json(event): Json<NewSafetyEvent>,
) -> Result<(StatusCode, Json<SafetyEvent>), AppError> {
    let controller = SafetyEventController::new(state.repository.clone());
    let saved = controller.create(event).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(update): Json<SafetyEventUpdate>,
) -> Result<Json<SafetyEvent>, AppError> {
    let controller = SafetyEventController::new(state.repository.clone());
    Ok(Json(controller.update(id, update).await?))
}

async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = SafetyEventController::new(state.repository.clone());
    controller.delete(id).await?;
    Ok(deleted("Safety event"))
}
