use axum::{extract::State, routing::get, Json, Router};

use crate::controllers::BootstrapController;
use crate::models::Snapshot;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_bootstrap_router() -> Router<AppState> {
    Router::new().route("/", get(bootstrap))
}

async fn bootstrap(State(state): State<AppState>) -> Result<Json<Snapshot>, AppError> {
    let controller = BootstrapController::new(state.repository.clone());
    let snapshot = controller.snapshot().await?;
    Ok(Json(snapshot))
}
