use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::controllers::ScorecardController;
use crate::dto::{GradeKey, GradeSheet};
use crate::models::ScoreCardEvent;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_scorecard_event_router() -> Router<AppState> {
    Router::new().route("/", get(list_events))
}

/// `/scorecard-grades?driver_id=&month=YYYY-MM&category=SAFETY`
pub fn create_scorecard_grade_router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(get_grade_sheet)
            .put(save_grade_sheet)
            .delete(delete_grade_sheet),
    )
}

async fn list_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<ScoreCardEvent>>, AppError> {
    let controller = ScorecardController::new(state.repository.clone());
    Ok(Json(controller.list_events().await?))
}

async fn get_grade_sheet(
    State(state): State<AppState>,
    Query(key): Query<GradeKey>,
) -> Result<Json<GradeSheet>, AppError> {
    let controller = ScorecardController::new(state.repository.clone());
    Ok(Json(controller.grade_sheet(key).await?))
}

async fn save_grade_sheet(
    State(state): State<AppState>,
    Json(sheet): Json<GradeSheet>,
) -> Result<Json<Vec<ScoreCardEvent>>, AppError> {
    let controller = ScorecardController::new(state.repository.clone());
    Ok(Json(controller.save(sheet).await?))
}

async fn delete_grade_sheet(
    State(state): State<AppState>,
    Query(key): Query<GradeKey>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = ScorecardController::new(state.repository.clone());
    let removed = controller.delete(key).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Scorecard deleted",
        "removed": removed
    })))
}
