//! Armado del servidor HTTP
//!
//! `build_router` monta todos los routers bajo `/api` con CORS, trazas y
//! timeout por request. `build_state` elige el backend de almacenamiento.

use axum::{
    error_handling::HandleErrorLayer, response::IntoResponse, BoxError, Json, Router,
};
use std::sync::Arc;
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::{DatabaseConfig, EnvironmentConfig, StorageBackend};
use crate::database::DatabaseConnection;
use crate::middleware::cors_layer;
use crate::repositories::{FleetRepository, MemoryFleetRepository, PgFleetRepository};
use crate::routes::{
    bootstrap_routes::create_bootstrap_router, docs_routes::create_docs_router,
    driver_routes::create_driver_router,
    driver_type_routes::create_driver_type_router, health_routes::create_health_router,
    safety_category_routes::create_safety_category_router,
    safety_event_routes::create_safety_event_router,
    scorecard_metric_routes::create_scorecard_metric_router,
    scorecard_routes::{create_scorecard_event_router, create_scorecard_grade_router},
    truck_routes::create_truck_router,
};
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

/// Router completo de la aplicación
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    let timeout = state.config.request_timeout;

    let api = Router::new()
        .merge(create_health_router())
        .nest("/bootstrap", create_bootstrap_router())
        .nest("/drivers", create_driver_router())
        .nest("/trucks", create_truck_router())
        .nest("/driver-types", create_driver_type_router())
        .nest("/safety-categories", create_safety_category_router())
        .nest("/safety-events", create_safety_event_router())
        .nest("/scorecard-metrics", create_scorecard_metric_router())
        .nest("/scorecard-events", create_scorecard_event_router())
        .nest("/scorecard-grades", create_scorecard_grade_router());

    Router::new()
        .merge(create_docs_router())
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(timeout)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn handle_middleware_error(err: BoxError) -> impl IntoResponse {
    let error = if err.is::<tower::timeout::error::Elapsed>() {
        AppError::ServiceUnavailable("request timed out".to_string())
    } else {
        AppError::Internal(err.to_string())
    };
    let status = error.status_code();
    (status, Json(error.to_error_response()))
}

/// Estado de la aplicación según `STORAGE`
pub async fn build_state(config: EnvironmentConfig) -> AppResult<AppState> {
    let repository: Arc<dyn FleetRepository> = match config.storage {
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .clone()
                .ok_or_else(|| AppError::Internal("DATABASE_URL must be set".to_string()))?;
            let connection = DatabaseConnection::connect(&DatabaseConfig::new(url)).await?;
            connection.run_migrations().await?;
            info!("🐘 Almacenamiento: PostgreSQL");
            Arc::new(PgFleetRepository::new(connection.pool().clone()))
        }
        StorageBackend::Memory => {
            warn!("🧪 Almacenamiento en memoria: los datos se pierden al apagar");
            Arc::new(MemoryFleetRepository::new())
        }
    };

    Ok(AppState::new(repository, config))
}
