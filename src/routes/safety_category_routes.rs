use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use super::deleted;
use crate::controllers::SafetyCategoryController;
use crate::dto::SafetyCategoryRequest;
use crate::models::SafetyCategory;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_safety_category_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/:id", put(update_category).delete(delete_category))
}

async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<SafetyCategory>>, AppError> {
    let controller = SafetyCategoryController::new(state.repository.clone());
    Ok(Json(controller.list().await?))
}

async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<SafetyCategoryRequest>,
) -> Result<(StatusCode, Json<SafetyCategory>), AppError> {
    let controller = SafetyCategoryController::new(state.repository.clone());
    let category = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<SafetyCategoryRequest>,
) -> Result<Json<SafetyCategory>, AppError> {
    let controller = SafetyCategoryController::new(state.repository.clone());
    Ok(Json(controller.update(id, request).await?))
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = SafetyCategoryController::new(state.repository.clone());
    controller.delete(id).await?;
    Ok(deleted("Safety category"))
}
