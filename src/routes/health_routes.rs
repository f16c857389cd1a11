use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::controllers::HealthController;
use crate::dto::HealthResponse;
use crate::state::AppState;

pub fn create_health_router() -> Router<AppState> {
    Router::new().route("/healthz", get(healthz))
}

async fn healthz(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let controller =
        HealthController::new(state.repository.clone(), state.config.request_timeout);
    match controller.check().await {
        Ok(body) => (StatusCode::OK, Json(body)),
        Err(body) => (StatusCode::SERVICE_UNAVAILABLE, Json(body)),
    }
}
