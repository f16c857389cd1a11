use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use super::deleted;
use crate::controllers::ScorecardMetricController;
use crate::dto::ScorecardMetricRequest;
use crate::models::ScoreCardItem;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_scorecard_metric_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_metrics).post(create_metric))
        .route("/:id", put(update_metric).delete(delete_metric))
}

async fn list_metrics(
    State(state): State<AppState>,
) -> Result<Json<Vec<ScoreCardItem>>, AppError> {
    let controller = ScorecardMetricController::new(state.repository.clone());
    Ok(Json(controller.list().await?))
}

async fn create_metric(
    State(state): State<AppState>,
    Json(request): Json<ScorecardMetricRequest>,
) -> Result<(StatusCode, Json<ScoreCardItem>), AppError> {
    let controller = ScorecardMetricController::new(state.repository.clone());
    let metric = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(metric)))
}

async fn update_metric(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<ScorecardMetricRequest>,
) -> Result<Json<ScoreCardItem>, AppError> {
    let controller = ScorecardMetricController::new(state.repository.clone());
    Ok(Json(controller.update(id, request).await?))
}

async fn delete_metric(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = ScorecardMetricController::new(state.repository.clone());
    controller.delete(id).await?;
    Ok(deleted("Scorecard metric"))
}
