use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use super::deleted;
use crate::controllers::DriverTypeController;
use crate::dto::DriverTypeRequest;
use crate::models::DriverType;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_driver_type_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_driver_types).post(create_driver_type))
        .route("/:id", put(update_driver_type).delete(delete_driver_type))
}

async fn list_driver_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<DriverType>>, AppError> {
    let controller = DriverTypeController::new(state.repository.clone());
    Ok(Json(controller.list().await?))
}

async fn create_driver_type(
    State(state): State<AppState>,
    Json(request): Json<DriverTypeRequest>,
) -> Result<(StatusCode, Json<DriverType>), AppError> {
    let controller = DriverTypeController::new(state.repository.clone());
    let driver_type = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(driver_type)))
}

async fn update_driver_type(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<DriverTypeRequest>,
) -> Result<Json<DriverType>, AppError> {
    let controller = DriverTypeController::new(state.repository.clone());
    Ok(Json(controller.update(id, request).await?))
}

async fn delete_driver_type(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = DriverTypeController::new(state.repository.clone());
    controller.delete(id).await?;
    Ok(deleted("Driver type"))
}
