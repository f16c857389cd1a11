use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};

use super::deleted;
use crate::controllers::DriverController;
use crate::dto::{AssignTruckRequest, AssignmentOutcome, DriverRequest};
use crate::models::{Driver, DriverStats};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_drivers).post(create_driver))
        .route("/:id", put(update_driver).delete(delete_driver))
        .route("/:id/stats", get(driver_stats))
        .route("/:id/assign-truck", post(assign_truck))
}

async fn list_drivers(State(state): State<AppState>) -> Result<Json<Vec<Driver>>, AppError> {
    let controller = DriverController::new(state.repository.clone());
    Ok(Json(controller.list().await?))
}

async fn create_driver(
    State(state): State<AppState>,
    Json(request): Json<DriverRequest>,
) -> Result<(StatusCode, Json<Driver>), AppError> {
    let controller = DriverController::new(state.repository.clone());
    let driver = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(driver)))
}

async fn update_driver(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<DriverRequest>,
) -> Result<Json<Driver>, AppError> {
    let controller = DriverController::new(state.repository.clone());
    Ok(Json(controller.update(id, request).await?))
}

async fn delete_driver(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = DriverController::new(state.repository.clone());
    controller.delete(id).await?;
    Ok(deleted("Driver"))
}

async fn driver_stats(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DriverStats>, AppError> {
    let controller = DriverController::new(state.repository.clone());
    Ok(Json(controller.stats(id).await?))
}

async fn assign_truck(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<AssignTruckRequest>,
) -> Result<Json<AssignmentOutcome>, AppError> {
    let controller = DriverController::new(state.repository.clone());
    Ok(Json(controller.assign_truck(id, request.truck_id).await?))
}
