use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};

use super::deleted;
use crate::controllers::TruckController;
use crate::dto::{AssignDriverRequest, AssignmentOutcome, TruckRequest};
use crate::models::{Truck, TruckHistoryEvent};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_truck_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_trucks).post(create_truck))
        .route("/:id", put(update_truck).delete(delete_truck))
        .route("/:id/history", get(truck_history))
        .route("/:id/assign-driver", post(assign_driver))
}

async fn list_trucks(State(state): State<AppState>) -> Result<Json<Vec<Truck>>, AppError> {
    let controller = TruckController::new(state.repository.clone());
    Ok(Json(controller.list().await?))
}

async fn create_truck(
    State(state): State<AppState>,
    Json(request): Json<TruckRequest>,
) -> Result<(StatusCode, Json<Truck>), AppError> {
    let controller = TruckController::new(state.repository.clone());
    let truck = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(truck)))
}

async fn update_truck(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<TruckRequest>,
) -> Result<Json<Truck>, AppError> {
    let controller = TruckController::new(state.repository.clone());
    Ok(Json(controller.update(id, request).await?))
}

async fn delete_truck(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = TruckController::new(state.repository.clone());
    controller.delete(id).await?;
    Ok(deleted("Truck"))
}

async fn truck_history(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<TruckHistoryEvent>>, AppError> {
    let controller = TruckController::new(state.repository.clone());
    Ok(Json(controller.history(id).await?))
}

async fn assign_driver(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<AssignDriverRequest>,
) -> Result<Json<AssignmentOutcome>, AppError> {
    let controller = TruckController::new(state.repository.clone());
    Ok(Json(controller.assign_driver(id, request.driver_id).await?))
}
